//! Modelo de movimiento de portería
//!
//! Un `MovementRecord` es un evento Gate-In/Gate-Out ligado (opcionalmente)
//! a un documento de envío. Todos los documentos de un mismo evento físico
//! comparten `gate_entry_no`.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::edit::EditButtonConfig;
use super::wire;

/// Tipo de documento de las entradas manuales
pub const MANUAL_ENTRY: &str = "Manual Entry";
/// Subtipo (o número de documento) de un placeholder sin documento real
pub const PENDING_ASSIGNMENT: &str = "Pending Assignment";
/// Tipo de documento de un vehículo vacío registrado sin documentos
pub const EMPTY_VEHICLE: &str = "Empty Vehicle";

/// Dirección del movimiento en la puerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "Gate-In")]
    GateIn,
    #[serde(rename = "Gate-Out")]
    GateOut,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::GateIn => "Gate-In",
            MovementType::GateOut => "Gate-Out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Gate-In" => Some(MovementType::GateIn),
            "Gate-Out" => Some(MovementType::GateOut),
            _ => None,
        }
    }

    /// El movimiento que debe seguir a éste
    pub fn opposite(&self) -> Self {
        match self {
            MovementType::GateIn => MovementType::GateOut,
            MovementType::GateOut => MovementType::GateIn,
        }
    }
}

impl Default for MovementType {
    fn default() -> Self {
        MovementType::GateIn
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registro de movimiento tal como lo entrega `/filtered-movements`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementRecord {
    #[serde(default)]
    pub id: i64,
    pub gate_entry_no: String,
    #[serde(default)]
    pub vehicle_no: String,
    pub movement_type: MovementType,
    #[serde(default, with = "wire::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "wire::opt_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub sub_document_type: Option<String>,
    #[serde(default)]
    pub document_no: Option<String>,
    #[serde(default, with = "wire::opt_datetime")]
    pub document_date: Option<NaiveDateTime>,

    // Datos operativos (necesarios para completar el registro)
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub km_reading: Option<String>,
    #[serde(default)]
    pub loader_names: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,

    #[serde(default)]
    pub security_name: Option<String>,
    #[serde(default)]
    pub security_username: Option<String>,
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    #[serde(default)]
    pub site_code: Option<String>,

    #[serde(default, with = "wire::opt_datetime")]
    pub last_edited_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "wire::null_as_zero")]
    pub edit_count: u32,

    /// Configuración calculada por el backend; si existe, prevalece sobre la local
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_button_config: Option<EditButtonConfig>,
}

impl MovementRecord {
    /// Instante combinado `(date, time)` del registro
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        match (self.date, self.time) {
            (Some(date), Some(time)) => Some(date.and_time(time)),
            _ => None,
        }
    }

    pub fn is_manual_entry(&self) -> bool {
        self.document_type.as_deref().map(str::trim) == Some(MANUAL_ENTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movement_type_wire_format() {
        assert_eq!(serde_json::to_value(MovementType::GateIn).unwrap(), json!("Gate-In"));
        let parsed: MovementType = serde_json::from_value(json!("Gate-Out")).unwrap();
        assert_eq!(parsed, MovementType::GateOut);
        assert_eq!(MovementType::GateIn.opposite(), MovementType::GateOut);
        assert_eq!(MovementType::from_str("Gate-X"), None);
    }

    #[test]
    fn test_record_from_backend_payload() {
        let record: MovementRecord = serde_json::from_value(json!({
            "id": 42,
            "gate_entry_no": "ATDVG2025123456",
            "vehicle_no": "MH12AB1234",
            "movement_type": "Gate-In",
            "date": "2025-01-15T00:00:00",
            "time": "08:15:30.250000",
            "document_type": "Manual Entry",
            "sub_document_type": "Pending Assignment",
            "document_no": null,
            "driver_name": "Ramesh",
            "km_reading": null,
            "edit_count": null,
            "unknown_field": "ignored"
        }))
        .unwrap();

        assert_eq!(record.id, 42);
        assert_eq!(record.edit_count, 0);
        assert!(record.is_manual_entry());
        let at = record.recorded_at().unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-15 08:15:30");
        assert!(record.edit_button_config.is_none());
    }

    #[test]
    fn test_record_without_time_has_no_timestamp() {
        let record: MovementRecord = serde_json::from_value(json!({
            "gate_entry_no": "G1",
            "movement_type": "Gate-Out",
            "date": "2025-01-15",
            "time": ""
        }))
        .unwrap();
        assert!(record.recorded_at().is_none());
    }
}
