//! Helpers de envío (lote, manual y manual múltiple)
//!
//! Empaquetan la selección del operador en un request y clasifican el
//! resultado de la búsqueda del vehículo.

use thiserror::Error;

use crate::dto::gate_dto::{
    BatchGateEntryRequest, BatchGateEntryResponse, GateEntryResponse, MultipleManualEntryResponse,
    MAX_MANUAL_DOCUMENTS,
};
use crate::models::document::RecentDocuments;
use crate::models::movement::MovementType;
use crate::utils::validation::{is_valid_vehicle_number, normalize_vehicle_number};

/// Rechazo local de un envío. `Display` es el mensaje para el operador.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please search for the vehicle first")]
    SearchRequired,

    #[error("Please select at least one document")]
    NoDocumentsSelected,

    #[error("Number of documents must be between 1 and 20")]
    InvalidDocumentCount,

    #[error("Invalid vehicle number format")]
    InvalidVehicleNumber,
}

/// Siguiente paso tras buscar un vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    ManualEntry,
    RegularEntry,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::ManualEntry => "manual_entry",
            NextAction::RegularEntry => "regular_entry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedAction {
    pub action: NextAction,
    pub reason: &'static str,
    pub message: String,
}

/// Sin documentos dentro de la ventana de búsqueda (o sin búsqueda)
pub fn is_empty_vehicle(search: Option<&RecentDocuments>) -> bool {
    search.map(|s| s.count == 0 || s.documents.is_empty()).unwrap_or(true)
}

pub fn recommended_action(search: Option<&RecentDocuments>) -> RecommendedAction {
    match search {
        Some(results) if !is_empty_vehicle(search) => RecommendedAction {
            action: NextAction::RegularEntry,
            reason: "Documents found - process regular gate entry",
            message: format!("Found {} document(s). Select documents to process.", results.count),
        },
        _ => RecommendedAction {
            action: NextAction::ManualEntry,
            reason: "No documents found - vehicle appears to be empty",
            message: "This vehicle has no recent documents. Create a manual entry.".to_string(),
        },
    }
}

/// Texto del botón de envío según el estado de la pantalla
pub fn submit_button_text(search: Option<&RecentDocuments>, selected: usize, submitting: bool) -> String {
    if submitting {
        return "Submitting...".to_string();
    }
    if search.is_none() {
        return "Search First".to_string();
    }
    if is_empty_vehicle(search) {
        return "Manual Entry".to_string();
    }
    if selected == 0 {
        return "Select Documents".to_string();
    }
    format!("Submit ({} selected)", selected)
}

/// Texto opcional de formulario: recortado, `None` si queda vacío
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Matrícula normalizada y con formato válido
pub fn clean_vehicle_number(vehicle_no: &str) -> Result<String, SubmissionError> {
    if !is_valid_vehicle_number(vehicle_no) {
        return Err(SubmissionError::InvalidVehicleNumber);
    }
    Ok(normalize_vehicle_number(vehicle_no))
}

/// Construir un envío por lote; sin documentos seleccionados se bloquea
pub fn build_batch_request(
    gate_type: MovementType,
    vehicle_no: &str,
    search: Option<&RecentDocuments>,
    selected: &[String],
    remarks: Option<&str>,
) -> Result<BatchGateEntryRequest, SubmissionError> {
    if search.is_none() {
        return Err(SubmissionError::SearchRequired);
    }
    let document_nos: Vec<String> = selected
        .iter()
        .map(|no| no.trim())
        .filter(|no| !no.is_empty())
        .map(str::to_string)
        .collect();
    if document_nos.is_empty() {
        return Err(SubmissionError::NoDocumentsSelected);
    }

    Ok(BatchGateEntryRequest {
        gate_type,
        vehicle_no: clean_vehicle_number(vehicle_no)?,
        document_nos,
        remarks: clean_optional(remarks),
    })
}

/// Número declarado de documentos para una entrada manual múltiple (1-20)
pub fn check_manual_count(count: u32) -> Result<u32, SubmissionError> {
    if (1..=MAX_MANUAL_DOCUMENTS).contains(&count) {
        Ok(count)
    } else {
        Err(SubmissionError::InvalidDocumentCount)
    }
}

pub fn format_manual_success(result: &GateEntryResponse) -> String {
    format!(
        "Manual {} completed successfully!\nGate Entry No: {}\nVehicle: {}",
        result.movement_type, result.gate_entry_no, result.vehicle_no
    )
}

pub fn format_batch_success(result: &BatchGateEntryResponse) -> String {
    format!(
        "{} completed successfully!\nProcessed: {}/{} documents\nGate Entry No: {}",
        result.movement_type, result.records_processed, result.total_requested, result.gate_entry_no
    )
}

pub fn format_multiple_manual_success(result: &MultipleManualEntryResponse) -> String {
    format!(
        "Successfully created {} manual entries!\nGate Entry No: {}\nVehicle: {}\n\nNext: Go to Insights tab to assign documents within 12 hours",
        result.records_created, result.gate_entry_no, result.vehicle_no
    )
}

pub fn format_assignment_success(document_no: &str) -> String {
    format!("Document {} assigned successfully!", document_no)
}
