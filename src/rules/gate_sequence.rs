//! Validación de secuencia de puerta
//!
//! Alternancia estricta: un vehículo sin historial debe entrar primero y,
//! a partir de ahí, cada Gate-In va seguido de un Gate-Out y viceversa.
//! El backend vuelve a validar con la misma regla; esta comprobación sólo
//! evita la ida y vuelta cuando el snapshot local ya muestra el conflicto.

use thiserror::Error;

use crate::models::movement::{MovementRecord, MovementType};
use crate::models::vehicle::{HistoryStatus, LastMovement, VehicleStatus};

/// Rechazo de una operación de puerta. `Display` es el mensaje para el operador.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateSequenceError {
    #[error("First entry for this vehicle must be Gate-In")]
    FirstEntryMustBeGateIn,

    #[error("Vehicle already has Gate-In ({date}). Must do Gate-Out first.")]
    AlreadyGateIn { date: String },

    #[error("Vehicle already has Gate-Out ({date}). Must do Gate-In first.")]
    AlreadyGateOut { date: String },
}

/// Decidir si `requested` es legal dado el último estado conocido del vehículo
pub fn validate_gate_sequence(
    status: Option<&VehicleStatus>,
    requested: MovementType,
) -> Result<(), GateSequenceError> {
    let status = match status {
        Some(status) if status.has_history() => status,
        _ => {
            return match requested {
                MovementType::GateIn => Ok(()),
                MovementType::GateOut => Err(GateSequenceError::FirstEntryMustBeGateIn),
            }
        }
    };

    let date = status
        .last_movement
        .as_ref()
        .map(LastMovement::display_date)
        .unwrap_or_else(|| "unknown date".to_string());

    match requested {
        MovementType::GateIn if !status.can_gate_in => Err(GateSequenceError::AlreadyGateIn { date }),
        MovementType::GateOut if !status.can_gate_out => Err(GateSequenceError::AlreadyGateOut { date }),
        _ => Ok(()),
    }
}

pub fn can_perform(status: Option<&VehicleStatus>, requested: MovementType) -> bool {
    validate_gate_sequence(status, requested).is_ok()
}

/// Calcular el estado del vehículo a partir de su historial (misma regla que el backend)
pub fn derive_vehicle_status(vehicle_no: &str, history: &[MovementRecord]) -> VehicleStatus {
    let last = history
        .iter()
        .filter(|record| record.date.is_some())
        .max_by_key(|record| (record.date, record.time));

    let Some(last) = last else {
        return VehicleStatus::no_history(vehicle_no);
    };

    let date = last
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    VehicleStatus {
        vehicle_no: vehicle_no.to_string(),
        status: HistoryStatus::Active,
        last_movement: Some(LastMovement {
            movement_type: last.movement_type,
            date: date.clone(),
            time: last.time.map(|t| t.format("%H:%M:%S").to_string()),
            gate_entry_no: Some(last.gate_entry_no.clone()),
        }),
        can_gate_in: last.movement_type == MovementType::GateOut,
        can_gate_out: last.movement_type == MovementType::GateIn,
        message: Some(format!("Last movement: {} on {}", last.movement_type, date)),
    }
}

/// Texto corto del estado para la pantalla de búsqueda
pub fn vehicle_status_text(status: Option<&VehicleStatus>) -> String {
    match status.and_then(|s| s.last_movement.as_ref()) {
        Some(last) => format!("Last: {} on {}", last.movement_type, last.display_date()),
        None => "No previous movements".to_string(),
    }
}
