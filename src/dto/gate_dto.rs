//! DTOs de entrada/salida por la puerta
//!
//! Cuerpos de `/batch-gate-entry`, `/enhanced-batch-gate-entry`,
//! `/manual-gate-entry`, `/enhanced-manual-gate-entry` y `/multiple-manual-entry`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::movement::MovementType;
use crate::rules::operational::{
    validate_driver_name_field, validate_km_reading_field, validate_loader_names_field,
};
use crate::utils::validation::{validate_document_number, validate_vehicle_number};

/// Máximo de documentos declarados en una entrada manual múltiple
pub const MAX_MANUAL_DOCUMENTS: u32 = 20;

/// Request de entrada por lote con documentos seleccionados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BatchGateEntryRequest {
    pub gate_type: MovementType,
    #[validate(custom = "validate_vehicle_number")]
    pub vehicle_no: String,
    #[validate(length(min = 1, message = "Please select at least one document"))]
    pub document_nos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Request de entrada por lote con datos operativos.
///
/// `document_nos` vacío registra un vehículo vacío.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnhancedBatchGateEntryRequest {
    pub gate_type: MovementType,
    #[validate(custom = "validate_vehicle_number")]
    pub vehicle_no: String,
    #[serde(default)]
    pub document_nos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[validate(custom = "validate_driver_name_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[validate(custom = "validate_km_reading_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub km_reading: Option<String>,
    #[validate(custom = "validate_loader_names_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_names: Option<String>,
}

/// Request de entrada manual (sin documento real).
///
/// Todos los campos de documento son opcionales; sólo la matrícula es obligatoria.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ManualGateEntryRequest {
    pub gate_type: MovementType,
    #[validate(custom = "validate_vehicle_number")]
    pub vehicle_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[validate(custom = "validate_document_number")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transporter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_way_bill_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_dispatch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesman_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Entrada manual con datos operativos
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EnhancedManualGateEntryRequest {
    #[serde(flatten)]
    #[validate]
    pub entry: ManualGateEntryRequest,
    #[validate(custom = "validate_driver_name_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[validate(custom = "validate_km_reading_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub km_reading: Option<String>,
    #[validate(custom = "validate_loader_names_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_names: Option<String>,
}

/// Request de varias entradas manuales que comparten un `gate_entry_no`.
///
/// El contrato usa `number_of_documents`; `no_of_documents` sólo se acepta al leer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MultipleManualEntryRequest {
    pub gate_type: MovementType,
    #[validate(custom = "validate_vehicle_number")]
    pub vehicle_no: String,
    #[serde(alias = "no_of_documents")]
    #[validate(range(min = 1, max = 20, message = "Number of documents must be between 1 and 20"))]
    pub number_of_documents: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[validate(custom = "validate_driver_name_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[validate(custom = "validate_km_reading_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub km_reading: Option<String>,
    #[validate(custom = "validate_loader_names_field")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_names: Option<String>,
}

/// Resultado por documento de una entrada por lote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub document_no: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessedDocument {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

/// Response de entrada por lote (normal y enhanced)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchGateEntryResponse {
    #[serde(default)]
    pub message: String,
    pub gate_entry_no: String,
    pub records_processed: usize,
    pub total_requested: usize,
    #[serde(default)]
    pub processed_documents: Vec<ProcessedDocument>,
    #[serde(default)]
    pub date: Option<String>,
    pub vehicle_no: String,
    pub movement_type: MovementType,
    #[serde(default)]
    pub operational_data_captured: Option<bool>,
    #[serde(default)]
    pub operational_complete: Option<bool>,
    #[serde(default)]
    pub missing_operational_fields: Vec<String>,
}

/// Response de entrada manual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateEntryResponse {
    pub gate_entry_no: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    pub vehicle_no: String,
    #[serde(default)]
    pub document_no: Option<String>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    pub movement_type: MovementType,
}

/// Response de entrada manual múltiple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleManualEntryResponse {
    #[serde(default)]
    pub message: String,
    pub gate_entry_no: String,
    pub records_created: usize,
    pub vehicle_no: String,
    #[serde(default)]
    pub movement_type: Option<MovementType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_requires_documents() {
        let request = BatchGateEntryRequest {
            gate_type: MovementType::GateIn,
            vehicle_no: "MH12AB1234".to_string(),
            document_nos: vec![],
            remarks: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_multiple_manual_count_range() {
        let mut request = MultipleManualEntryRequest {
            gate_type: MovementType::GateIn,
            vehicle_no: "MH12AB1234".to_string(),
            number_of_documents: 20,
            remarks: None,
            driver_name: None,
            km_reading: None,
            loader_names: None,
        };
        assert!(request.validate().is_ok());

        request.number_of_documents = 21;
        assert!(request.validate().is_err());

        request.number_of_documents = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_legacy_document_count_name() {
        let request: MultipleManualEntryRequest = serde_json::from_value(json!({
            "gate_type": "Gate-Out",
            "vehicle_no": "MH12AB1234",
            "no_of_documents": 3
        }))
        .unwrap();
        assert_eq!(request.number_of_documents, 3);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["number_of_documents"], 3);
        assert!(body.get("no_of_documents").is_none());
    }

    #[test]
    fn test_manual_document_number_is_optional() {
        let mut request = ManualGateEntryRequest {
            gate_type: MovementType::GateIn,
            vehicle_no: "MH12AB1234".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        request.document_no = Some("AB".to_string());
        assert!(request.validate().is_err());

        request.document_no = Some("INV-001".to_string());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_enhanced_manual_flattens_entry() {
        let request = EnhancedManualGateEntryRequest {
            entry: ManualGateEntryRequest {
                gate_type: MovementType::GateIn,
                vehicle_no: "MH12AB1234".to_string(),
                ..Default::default()
            },
            driver_name: Some("Ramesh".to_string()),
            km_reading: Some("12a".to_string()),
            loader_names: None,
        };
        assert!(request.validate().is_err());

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["vehicle_no"], "MH12AB1234");
        assert_eq!(body["driver_name"], "Ramesh");
    }
}
