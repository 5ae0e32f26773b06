//! DTOs de la pestaña de insights
//!
//! Consulta de movimientos, edición de datos operativos, asignación de
//! documentos y contadores agregados.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::movement::{MovementRecord, MovementType};
use crate::rules::operational::{
    validate_driver_name_field, validate_km_reading_field, validate_loader_names_field,
};

/// Filtro de `/filtered-movements`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range", skip_on_field_errors = false))]
pub struct MovementFilter {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default)]
    pub site_code: Option<String>,
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub movement_type: Option<MovementType>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub manual_only: bool,
    #[serde(default)]
    pub needs_edit: bool,
}

impl MovementFilter {
    /// Filtro de un único día
    pub fn for_day(day: NaiveDate) -> Self {
        Self::between(day, day)
    }

    pub fn between(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            from_date,
            to_date,
            site_code: None,
            warehouse_code: None,
            movement_type: None,
            vehicle_no: None,
            manual_only: false,
            needs_edit: false,
        }
    }
}

fn validate_date_range(filter: &MovementFilter) -> Result<(), ValidationError> {
    if filter.from_date > filter.to_date {
        let mut error = ValidationError::new("date_range");
        error.message = Some("From date must not be after to date".into());
        return Err(error);
    }
    Ok(())
}

/// Response de `/filtered-movements`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilteredMovementsResponse {
    #[serde(default)]
    pub results: Vec<MovementRecord>,
    #[serde(default)]
    pub total_records: Option<usize>,
}

/// Edición de datos operativos (`PUT /update-operational-data`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OperationalUpdate {
    #[validate(length(min = 1, message = "Gate entry number is required"))]
    pub gate_entry_no: String,
    #[validate(custom = "validate_driver_name_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[validate(custom = "validate_km_reading_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub km_reading: Option<String>,
    #[validate(custom = "validate_loader_names_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Response de `/update-operational-data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalUpdateResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub gate_entry_no: Option<String>,
    #[serde(default)]
    pub records_updated: Option<usize>,
    #[serde(default)]
    pub edit_count: Option<u32>,
    #[serde(default)]
    pub operational_complete: Option<bool>,
}

/// Asignación de un documento real a un placeholder manual.
///
/// El contrato usa `insights_record_id`; `insights_id` sólo se acepta al leer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AssignDocumentRequest {
    #[serde(alias = "insights_id")]
    #[validate(range(min = 1, message = "Invalid record ID"))]
    pub insights_record_id: i64,
    #[validate(custom = "validate_assigned_document")]
    pub document_no: String,
}

fn validate_assigned_document(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("document_no");
        error.message = Some("Document number is required".into());
        return Err(error);
    }
    Ok(())
}

/// Response de `/assign-document`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDocumentResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub insights_record_id: Option<i64>,
    #[serde(default)]
    pub document_no: Option<String>,
}

/// Response de `/unassigned-count`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UnassignedCount {
    pub unassigned_count: usize,
}

/// Response de `/km-reading-context/{gate_entry_no}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmReadingContext {
    pub gate_entry_no: String,
    pub movement_type: MovementType,
    pub vehicle_no: String,
    #[serde(default)]
    pub previous_km_reading: Option<String>,
    #[serde(default)]
    pub current_km_reading: Option<String>,
    pub reading_type: String,
    #[serde(default)]
    pub suggested_range: Option<SuggestedRange>,
}

/// Rango sugerido para la lectura de KM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedRange {
    pub min: u32,
    pub max: u32,
}

/// Response de `/records-needing-completion`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsNeedingCompletion {
    #[serde(default)]
    pub total_records: usize,
    #[serde(default)]
    pub records: Vec<MovementRecord>,
}

/// Response de `/operational-summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationalSummary {
    pub total_records: usize,
    #[serde(default)]
    pub completion_stats: CompletionStats,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionStats {
    #[serde(default)]
    pub complete_operational: usize,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub missing_driver: usize,
    #[serde(default)]
    pub missing_km: usize,
    #[serde(default)]
    pub missing_loaders: usize,
    #[serde(default)]
    pub multiple_edits: usize,
}
