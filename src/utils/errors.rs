//! Sistema de manejo de errores
//!
//! Este módulo define la taxonomía de errores del cliente de portería y
//! su conversión a mensajes para el operador. `GateError::user_message`
//! es el único punto donde un fallo se traduce a texto visible.

use http::StatusCode;
use thiserror::Error;

use crate::rules::assignment::AssignmentError;
use crate::rules::gate_sequence::GateSequenceError;
use crate::rules::operational::FieldError;
use crate::rules::submission::SubmissionError;

/// Marcador que el backend incluye en los conflictos de secuencia
pub const SEQUENCE_CONFLICT_MARKER: &str = "already has Gate";

/// Errores principales del cliente
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Sequence(#[from] GateSequenceError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Edit not allowed: {0}")]
    EditNotAllowed(String),

    #[error("Sequence conflict: {0}")]
    SequenceConflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable entity: {0}")]
    Unprocessable(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Submission already in progress")]
    SubmissionInProgress,

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Resultado tipado para operaciones que pueden fallar
pub type GateResult<T> = Result<T, GateError>;

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GateError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => GateError::from_response(status, None),
            // Sin respuesta: timeout, conexión rechazada, DNS...
            None => GateError::Network(err.to_string()),
        }
    }
}

impl GateError {
    /// Clasificar una respuesta HTTP fallida según su código y el `detail` del backend
    pub fn from_response(status: StatusCode, detail: Option<String>) -> Self {
        let detail = detail.filter(|d| !d.trim().is_empty());

        match status {
            StatusCode::BAD_REQUEST => match detail {
                Some(d) if d.contains(SEQUENCE_CONFLICT_MARKER) => GateError::SequenceConflict(d),
                Some(d) => GateError::BadRequest(d),
                None => GateError::BadRequest("Invalid request data".to_string()),
            },
            StatusCode::UNAUTHORIZED => GateError::Unauthorized(detail.unwrap_or_default()),
            StatusCode::FORBIDDEN => GateError::Forbidden(detail.unwrap_or_default()),
            StatusCode::NOT_FOUND => GateError::NotFound(
                detail.unwrap_or_else(|| "No recent documents found".to_string()),
            ),
            StatusCode::UNPROCESSABLE_ENTITY => GateError::Unprocessable(detail.unwrap_or_default()),
            StatusCode::INTERNAL_SERVER_ERROR => GateError::Server(detail.unwrap_or_default()),
            other => GateError::Http {
                status: other.as_u16(),
                detail: detail.unwrap_or_default(),
            },
        }
    }

    /// Mensaje para el operador. Es la única traducción de errores a texto visible.
    pub fn user_message(&self) -> String {
        match self {
            GateError::Validation(errors) => validation_summary(errors),
            GateError::Sequence(e) => e.to_string(),
            GateError::Field(e) => e.to_string(),
            GateError::Assignment(e) => e.to_string(),
            GateError::Submission(e) => e.to_string(),
            GateError::EditNotAllowed(msg) => msg.clone(),
            GateError::SequenceConflict(detail) => detail.clone(),
            GateError::BadRequest(detail) => detail.clone(),
            GateError::Unauthorized(_) => "Authentication failed. Please login again.".to_string(),
            GateError::Forbidden(detail) => {
                if detail.contains("Edit window expired") {
                    "Edit window expired. Records can only be edited within 24 hours.".to_string()
                } else if detail.contains("only edit your own") {
                    "You can only edit your own gate entries.".to_string()
                } else {
                    "Access denied. Insufficient permissions.".to_string()
                }
            }
            GateError::NotFound(detail) => detail.clone(),
            GateError::Unprocessable(_) => "Validation error. Please check your input.".to_string(),
            GateError::Server(_) => "Server error. Please try again later.".to_string(),
            GateError::Http { status, detail } => {
                if detail.is_empty() {
                    format!("Server error ({})", status)
                } else {
                    detail.clone()
                }
            }
            GateError::Network(_) => "Network error. Please check your connection.".to_string(),
            GateError::SubmissionInProgress => {
                "A submission is already in progress. Please wait.".to_string()
            }
            GateError::Jwt(_) => "Session is invalid. Please login again.".to_string(),
            GateError::Config(msg) => msg.clone(),
            GateError::Serialization(_) | GateError::Decode(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }

    /// Conflicto esperado entre dispositivos: se muestra el mensaje del backend, sin reintentar
    pub fn is_sequence_conflict(&self) -> bool {
        matches!(self, GateError::SequenceConflict(_))
    }

    /// El operador debe volver a iniciar sesión
    pub fn requires_login(&self) -> bool {
        matches!(self, GateError::Unauthorized(_) | GateError::Jwt(_))
    }
}

/// Resumen legible de errores de validación, ordenado por campo
fn validation_summary(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();

    if messages.is_empty() {
        "Validation error. Please check your input.".to_string()
    } else {
        format!("Validation failed: {}", messages.join(", "))
    }
}

/// Función helper para crear errores de validación de un campo
pub fn validation_error(field: &'static str, message: &'static str) -> GateError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.message = Some(message.into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    GateError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_conflict_is_surfaced_verbatim() {
        let detail = "Vehicle MH12AB1234 already has Gate-In on 2025-01-15. Must do Gate-Out first.";
        let err = GateError::from_response(StatusCode::BAD_REQUEST, Some(detail.to_string()));
        assert!(err.is_sequence_conflict());
        assert_eq!(err.user_message(), detail);
    }

    #[test]
    fn test_bad_request_without_detail() {
        let err = GateError::from_response(StatusCode::BAD_REQUEST, None);
        assert_eq!(err.user_message(), "Invalid request data");
    }

    #[test]
    fn test_forbidden_messages() {
        let expired = GateError::from_response(
            StatusCode::FORBIDDEN,
            Some("Edit window expired. Records can only be edited within 24 hours.".to_string()),
        );
        assert_eq!(
            expired.user_message(),
            "Edit window expired. Records can only be edited within 24 hours."
        );

        let owner = GateError::from_response(
            StatusCode::FORBIDDEN,
            Some("You can only edit your own gate entries (or admin access required)".to_string()),
        );
        assert_eq!(owner.user_message(), "You can only edit your own gate entries.");

        let other = GateError::from_response(StatusCode::FORBIDDEN, None);
        assert_eq!(other.user_message(), "Access denied. Insufficient permissions.");
    }

    #[test]
    fn test_status_mapping() {
        assert!(GateError::from_response(StatusCode::UNAUTHORIZED, None).requires_login());
        assert_eq!(
            GateError::from_response(StatusCode::NOT_FOUND, None).user_message(),
            "No recent documents found"
        );
        assert_eq!(
            GateError::from_response(StatusCode::UNPROCESSABLE_ENTITY, Some("x".into())).user_message(),
            "Validation error. Please check your input."
        );
        assert_eq!(
            GateError::from_response(StatusCode::INTERNAL_SERVER_ERROR, None).user_message(),
            "Server error. Please try again later."
        );
        assert_eq!(
            GateError::from_response(StatusCode::BAD_GATEWAY, None).user_message(),
            "Server error (502)"
        );
    }

    #[test]
    fn test_validation_error_helper() {
        let err = validation_error("vehicle_no", "Vehicle number is required");
        assert_eq!(err.user_message(), "Validation failed: Vehicle number is required");
    }
}
