//! Modelo de estado de vehículo
//!
//! Snapshot derivado del historial de movimientos. Se calcula en cada búsqueda
//! y no se cachea más allá de la interacción actual.

use serde::{Deserialize, Serialize};

use super::movement::{MovementRecord, MovementType};
use crate::utils::validation::validate_date;

/// Historial del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    NoHistory,
    Active,
}

/// Último movimiento conocido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMovement {
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub gate_entry_no: Option<String>,
}

impl LastMovement {
    /// Fecha para mensajes (`YYYY-MM-DD`); si no se puede leer se muestra tal cual
    pub fn display_date(&self) -> String {
        validate_date(&self.date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.date.clone())
    }
}

/// Respuesta de `/vehicle-status/{vehicle_no}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStatus {
    pub vehicle_no: String,
    pub status: HistoryStatus,
    #[serde(default)]
    pub last_movement: Option<LastMovement>,
    pub can_gate_in: bool,
    pub can_gate_out: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl VehicleStatus {
    /// Estado de un vehículo sin movimientos: sólo puede entrar
    pub fn no_history(vehicle_no: &str) -> Self {
        Self {
            vehicle_no: vehicle_no.to_string(),
            status: HistoryStatus::NoHistory,
            last_movement: None,
            can_gate_in: true,
            can_gate_out: false,
            message: Some("No previous gate movements found".to_string()),
        }
    }

    pub fn has_history(&self) -> bool {
        self.status == HistoryStatus::Active
    }
}

/// Respuesta de `/vehicle-history/{vehicle_no}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleHistory {
    pub vehicle_no: String,
    #[serde(default)]
    pub total_movements: usize,
    #[serde(default)]
    pub history: Vec<MovementRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_payload() {
        let status: VehicleStatus = serde_json::from_value(json!({
            "vehicle_no": "MH12AB1234",
            "status": "active",
            "last_movement": {
                "type": "Gate-In",
                "date": "2025-01-15T00:00:00",
                "time": "08:00:00",
                "gate_entry_no": "ATDVG2025000001"
            },
            "can_gate_in": false,
            "can_gate_out": true,
            "message": "Last movement: Gate-In on 2025-01-15"
        }))
        .unwrap();

        assert!(status.has_history());
        let last = status.last_movement.unwrap();
        assert_eq!(last.movement_type, MovementType::GateIn);
        assert_eq!(last.display_date(), "2025-01-15");
    }

    #[test]
    fn test_no_history_payload() {
        let status: VehicleStatus = serde_json::from_value(json!({
            "vehicle_no": "MH12AB1234",
            "status": "no_history",
            "last_movement": null,
            "can_gate_in": true,
            "can_gate_out": false
        }))
        .unwrap();
        assert_eq!(status, VehicleStatus {
            message: None,
            ..VehicleStatus::no_history("MH12AB1234")
        });
    }
}
