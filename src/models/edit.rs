//! Modelos de estado de edición
//!
//! Clasificación derivada (nunca persistida) de lo que el operador puede hacer
//! con un registro de movimiento. Se recalcula con cada consulta.

use serde::{Deserialize, Serialize};

/// Color del botón de edición
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Yellow,
    Green,
    Black,
    Gray,
}

/// Prioridad en las listas de trabajo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditPriority {
    High,
    Medium,
    None,
}

impl EditPriority {
    /// Valor de ordenación: high=1, medium=2, none=3
    pub fn value(&self) -> u8 {
        match self {
            EditPriority::High => 1,
            EditPriority::Medium => 2,
            EditPriority::None => 3,
        }
    }
}

/// Acción asociada al botón
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    CompleteRequired,
    EditOptional,
    ViewOnly,
    NoAccess,
}

/// Campos operativos que un registro necesita para considerarse completo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationalField {
    DriverName,
    KmReading,
    LoaderNames,
}

impl OperationalField {
    /// Orden fijo en el que se informan los campos faltantes
    pub const ALL: [OperationalField; 3] = [
        OperationalField::DriverName,
        OperationalField::KmReading,
        OperationalField::LoaderNames,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OperationalField::DriverName => "Driver Name",
            OperationalField::KmReading => "KM Reading",
            OperationalField::LoaderNames => "Loader Names",
        }
    }

    /// Nombre del campo en el payload del backend
    pub fn key(&self) -> &'static str {
        match self {
            OperationalField::DriverName => "driver_name",
            OperationalField::KmReading => "km_reading",
            OperationalField::LoaderNames => "loader_names",
        }
    }
}

/// Configuración del botón de edición de un registro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditButtonConfig {
    pub color: ButtonColor,
    pub text: String,
    pub enabled: bool,
    pub priority: EditPriority,
    #[serde(default)]
    pub message: String,
    pub action: EditAction,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_count: Option<u32>,
}

/// Estado de completitud de un registro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    NeedsCompletion,
    Editable,
    Expired,
}

impl EditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditStatus::NeedsCompletion => "needs_completion",
            EditStatus::Editable => "editable",
            EditStatus::Expired => "expired",
        }
    }
}

/// Estadísticas de edición (mismo formato que `/edit-statistics`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditStatistics {
    pub total_records: usize,
    pub needs_completion: usize,
    pub complete_and_editable: usize,
    pub expired: usize,
    pub completion_percentage: f64,

    // Antigüedad de los registros dentro de la ventana de edición
    pub within_6_hours: usize,
    pub within_12_hours: usize,
    pub within_24_hours: usize,

    pub missing_driver: usize,
    pub missing_km: usize,
    pub missing_loaders: usize,

    pub edited_today: usize,
    /// `gate_entry_no` del registro con más ediciones
    #[serde(default)]
    pub most_edited_record: Option<String>,
    pub avg_edits_per_record: f64,
}
