//! Ventana de asignación de documentos
//!
//! Una entrada manual sin documento real ("Manual Entry" / "Pending Assignment")
//! puede recibir un documento durante 12 horas desde su creación. Pasado ese
//! plazo queda bloqueada como placeholder, aunque sus datos operativos sigan
//! siendo editables dentro de las 24 horas.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use super::windows::Window;
use crate::dto::insights_dto::AssignDocumentRequest;
use crate::models::document::Document;
use crate::models::movement::{MovementRecord, PENDING_ASSIGNMENT};
use crate::utils::validation::{has_text, normalize_vehicle_number};

/// Antigüedad máxima de un documento candidato
pub const CANDIDATE_HORIZON_HOURS: i64 = 18;

/// Rechazo de una asignación. `Display` es el mensaje para el operador.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("Document already assigned to this record")]
    AlreadyAssigned,

    #[error("Assignment window expired. Documents can only be assigned within 12 hours.")]
    WindowClosed,

    #[error("Please select a document to assign")]
    NoDocumentSelected,

    #[error("Invalid record ID")]
    InvalidRecord,
}

/// Elegibilidad de un registro para recibir un documento
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentEligibility {
    /// Ya tiene un documento real
    NotRequired,
    /// Placeholder dentro de la ventana
    Open { remaining: String },
    /// Placeholder fuera de la ventana: bloqueado
    Expired,
}

impl AssignmentEligibility {
    pub fn is_assignable(&self) -> bool {
        matches!(self, AssignmentEligibility::Open { .. })
    }

    /// Etiqueta de la columna de documento en la lista
    pub fn label(&self) -> String {
        match self {
            AssignmentEligibility::NotRequired => "Assigned".to_string(),
            AssignmentEligibility::Open { remaining } => format!("Assign ({} left)", remaining),
            AssignmentEligibility::Expired => "⚫ Expired".to_string(),
        }
    }
}

/// El registro es un placeholder manual pendiente de documento
pub fn needs_assignment(record: &MovementRecord) -> bool {
    if !record.is_manual_entry() {
        return false;
    }
    let pending_subtype = record.sub_document_type.as_deref().map(str::trim) == Some(PENDING_ASSIGNMENT);
    let placeholder_no = !has_text(record.document_no.as_deref())
        || record.document_no.as_deref().map(str::trim) == Some(PENDING_ASSIGNMENT);
    pending_subtype || placeholder_no
}

pub fn is_assignment_window_open(record: &MovementRecord, now: NaiveDateTime) -> bool {
    Window::Assignment.is_open(record, now)
}

/// Tiempo restante para asignar (`"{h}h {m}m"`), `None` si la ventana cerró
pub fn assignment_time_remaining(record: &MovementRecord, now: NaiveDateTime) -> Option<String> {
    Window::Assignment.remaining_text(record, now)
}

pub fn eligibility(record: &MovementRecord, now: NaiveDateTime) -> AssignmentEligibility {
    if !needs_assignment(record) {
        return AssignmentEligibility::NotRequired;
    }
    match assignment_time_remaining(record, now) {
        Some(remaining) => AssignmentEligibility::Open { remaining },
        None => AssignmentEligibility::Expired,
    }
}

/// Documentos que se pueden ofrecer para un placeholder: mismo vehículo,
/// sin evento de portería y observados dentro del horizonte de 18 horas.
/// Un documento con fecha futura (reloj desfasado) no es candidato.
pub fn candidate_documents<'a>(
    documents: &'a [Document],
    vehicle_no: &str,
    now: NaiveDateTime,
) -> Vec<&'a Document> {
    let vehicle = normalize_vehicle_number(vehicle_no);
    let horizon = Duration::hours(CANDIDATE_HORIZON_HOURS);

    documents
        .iter()
        .filter(|doc| !has_text(doc.gate_entry_no.as_deref()))
        .filter(|doc| {
            doc.vehicle_no
                .as_deref()
                .map(|v| normalize_vehicle_number(v) == vehicle)
                .unwrap_or(true)
        })
        .filter(|doc| match (doc.document_date, doc.age_hours) {
            (Some(date), _) => {
                let age = now - date;
                age >= Duration::zero() && age < horizon
            }
            (None, Some(age)) => (0.0..CANDIDATE_HORIZON_HOURS as f64).contains(&age),
            (None, None) => true,
        })
        .collect()
}

/// Comprobar localmente una asignación y construir el request.
///
/// El backend sigue siendo la autoridad; esto evita enviar asignaciones
/// que ya se sabe que serán rechazadas.
pub fn check_assignable(
    record: &MovementRecord,
    document_no: &str,
    now: NaiveDateTime,
) -> Result<AssignDocumentRequest, AssignmentError> {
    if record.id <= 0 {
        return Err(AssignmentError::InvalidRecord);
    }
    match eligibility(record, now) {
        AssignmentEligibility::NotRequired => Err(AssignmentError::AlreadyAssigned),
        AssignmentEligibility::Expired => Err(AssignmentError::WindowClosed),
        AssignmentEligibility::Open { .. } => {
            let document_no = document_no.trim();
            if document_no.is_empty() {
                return Err(AssignmentError::NoDocumentSelected);
            }
            Ok(AssignDocumentRequest {
                insights_record_id: record.id,
                document_no: document_no.to_string(),
            })
        }
    }
}

/// Reflejar localmente una asignación aceptada por el backend
pub fn mark_assigned(record: &mut MovementRecord, document: &Document) -> Result<(), AssignmentError> {
    if !needs_assignment(record) {
        return Err(AssignmentError::AlreadyAssigned);
    }
    record.document_no = Some(document.document_no.clone());
    record.document_type = document.document_type.clone();
    record.sub_document_type = document.sub_document_type.clone();
    record.document_date = document.document_date;
    record.edit_count += 1;
    record.edit_button_config = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movement::MANUAL_ENTRY;
    use chrono::{NaiveDate, NaiveTime};

    fn placeholder() -> MovementRecord {
        MovementRecord {
            id: 10,
            gate_entry_no: "G1".to_string(),
            vehicle_no: "MH12AB1234".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15),
            time: NaiveTime::from_hms_opt(6, 0, 0),
            document_type: Some(MANUAL_ENTRY.to_string()),
            sub_document_type: Some(PENDING_ASSIGNMENT.to_string()),
            ..Default::default()
        }
    }

    fn hours_later(h: i64) -> NaiveDateTime {
        placeholder().recorded_at().unwrap() + Duration::hours(h)
    }

    fn document(no: &str, vehicle: Option<&str>, age_hours: i64) -> Document {
        Document {
            document_no: no.to_string(),
            document_type: Some("Invoice".to_string()),
            vehicle_no: vehicle.map(str::to_string),
            document_date: Some(hours_later(0) - Duration::hours(age_hours)),
            ..Default::default()
        }
    }

    #[test]
    fn test_needs_assignment() {
        assert!(needs_assignment(&placeholder()));

        let mut assigned = placeholder();
        assigned.document_type = Some("Invoice".to_string());
        assigned.sub_document_type = Some("Sales".to_string());
        assigned.document_no = Some("INV001".to_string());
        assert!(!needs_assignment(&assigned));

        let mut null_doc = placeholder();
        null_doc.sub_document_type = None;
        assert!(needs_assignment(&null_doc));
    }

    #[test]
    fn test_window_is_independent_of_edit_window() {
        let record = placeholder();
        assert!(eligibility(&record, hours_later(11)).is_assignable());
        assert_eq!(eligibility(&record, hours_later(12)), AssignmentEligibility::Expired);
        assert_eq!(eligibility(&record, hours_later(13)).label(), "⚫ Expired");
    }

    #[test]
    fn test_check_assignable() {
        let record = placeholder();
        let request = check_assignable(&record, " INV001 ", hours_later(2)).unwrap();
        assert_eq!(request.insights_record_id, 10);
        assert_eq!(request.document_no, "INV001");

        assert_eq!(
            check_assignable(&record, "", hours_later(2)),
            Err(AssignmentError::NoDocumentSelected)
        );
        assert_eq!(
            check_assignable(&record, "INV001", hours_later(13)),
            Err(AssignmentError::WindowClosed)
        );
    }

    #[test]
    fn test_assigning_twice_is_rejected() {
        let mut record = placeholder();
        let doc = document("INV001", Some("MH12AB1234"), 1);
        mark_assigned(&mut record, &doc).unwrap();

        assert_eq!(record.edit_count, 1);
        assert_eq!(record.document_no.as_deref(), Some("INV001"));
        assert_eq!(mark_assigned(&mut record, &doc), Err(AssignmentError::AlreadyAssigned));
        assert_eq!(
            check_assignable(&record, "INV002", hours_later(1)),
            Err(AssignmentError::AlreadyAssigned)
        );
    }

    #[test]
    fn test_candidate_documents() {
        let mut linked = document("INV003", Some("MH12AB1234"), 1);
        linked.gate_entry_no = Some("G9".to_string());
        let documents = vec![
            document("INV001", Some("mh12ab1234"), 2),
            document("INV002", Some("KA01AB1234"), 2),
            linked,
            document("INV004", Some("MH12AB1234"), 19),
            document("INV005", None, 17),
            document("INV006", Some("MH12AB1234"), -2),
            Document {
                document_date: None,
                age_hours: Some(-0.5),
                ..document("INV007", Some("MH12AB1234"), 0)
            },
        ];

        let candidates: Vec<_> = candidate_documents(&documents, "MH12AB1234", hours_later(0))
            .into_iter()
            .map(|d| d.document_no.as_str())
            .collect();
        assert_eq!(candidates, vec!["INV001", "INV005"]);
    }
}
