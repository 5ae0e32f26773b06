//! Modelo de documento de envío
//!
//! Documentos sincronizados desde el sistema origen (facturas, transferencias...)
//! que se asocian a un movimiento de portería.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::wire;

/// Documento real candidato a un movimiento
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub document_no: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub sub_document_type: Option<String>,
    #[serde(default, with = "wire::opt_datetime")]
    pub document_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_code: Option<String>,
    #[serde(default)]
    pub transporter_name: Option<String>,
    #[serde(default)]
    pub e_way_bill_no: Option<String>,
    #[serde(default)]
    pub route_code: Option<String>,
    /// Documento ya ligado a un evento de portería
    #[serde(default)]
    pub gate_entry_no: Option<String>,
    #[serde(default)]
    pub age_hours: Option<f64>,
}

/// Respuesta de `/search-recent-documents/{vehicle_no}` (ventana de 18 horas)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentDocuments {
    pub vehicle_no: String,
    pub count: usize,
    #[serde(default)]
    pub search_time: Option<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl RecentDocuments {
    /// Resultado vacío: un 404 del backend significa "cero documentos", no un fallo
    pub fn empty(vehicle_no: &str) -> Self {
        Self {
            vehicle_no: vehicle_no.to_string(),
            count: 0,
            search_time: None,
            documents: Vec::new(),
        }
    }
}

/// Respuesta de `/available-documents/{vehicle_no}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailableDocuments {
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub documents: Vec<Document>,
}
