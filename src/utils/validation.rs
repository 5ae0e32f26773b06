//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de los formatos de fecha/hora que entrega el backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Matrícula india: estado (2 letras), distrito (1-2 dígitos), serie (1-3 letras), número (4 dígitos)
    static ref VEHICLE_NUMBER_PATTERN: Regex =
        Regex::new(r"^[A-Z]{2}[0-9]{1,2}[A-Z]{1,3}[0-9]{4}$").expect("valid vehicle number pattern");
}

/// Normalizar matrícula: mayúsculas y sólo caracteres alfanuméricos
pub fn normalize_vehicle_number(value: &str) -> String {
    value
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Verificar formato de matrícula (tras normalizar)
pub fn is_valid_vehicle_number(value: &str) -> bool {
    let cleaned = normalize_vehicle_number(value);
    (8..=10).contains(&cleaned.len()) && VEHICLE_NUMBER_PATTERN.is_match(&cleaned)
}

/// Validar matrícula para formularios
pub fn validate_vehicle_number(value: &str) -> Result<(), ValidationError> {
    validate_not_empty(value).map_err(|mut e| {
        e.message = Some("Vehicle number is required".into());
        e
    })?;

    if !is_valid_vehicle_number(value) {
        let mut error = ValidationError::new("vehicle_number");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("Invalid vehicle number format".into());
        return Err(error);
    }
    Ok(())
}

/// Validar número de documento (opcional, mínimo 3 caracteres si existe)
pub fn validate_document_number(value: &str) -> Result<(), ValidationError> {
    validate_length(value.trim(), 3, 100).map_err(|mut e| {
        e.message = Some("Document number must be at least 3 characters".into());
        e
    })
}

/// Validar y convertir la fecha de un registro.
///
/// El backend entrega `YYYY-MM-DD` o un datetime ISO (`2025-01-15T00:00:00`)
/// cuando la columna es de tipo timestamp; sólo interesa la parte de fecha.
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir la hora de un registro (`HH:MM`, `HH:MM:SS` o con fracción)
pub fn validate_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            let mut error = ValidationError::new("time");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"HH:MM:SS".to_string());
            error
        })
}

/// Validar y convertir un datetime (ISO local, con espacio o RFC3339)
pub fn validate_datetime(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_local()))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"ISO-8601".to_string());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud mínima y máxima
pub fn validate_length(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        let mut error = ValidationError::new("length");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Texto no vacío tras recortar espacios
pub fn has_text(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_vehicle_number() {
        assert_eq!(normalize_vehicle_number(" mh-12 ab 1234 "), "MH12AB1234");
        assert_eq!(normalize_vehicle_number(""), "");
    }

    #[test]
    fn test_vehicle_number_format() {
        assert!(is_valid_vehicle_number("MH12AB1234"));
        assert!(is_valid_vehicle_number("mh 12 ab 1234"));
        assert!(is_valid_vehicle_number("KA1A1234"));
        assert!(!is_valid_vehicle_number("12AB1234"));
        assert!(!is_valid_vehicle_number("MH12AB123"));
        assert!(!is_valid_vehicle_number("MH123ABCD1234"));
    }

    #[test]
    fn test_validate_vehicle_number_messages() {
        let empty = validate_vehicle_number("  ").unwrap_err();
        assert_eq!(empty.message.as_deref(), Some("Vehicle number is required"));

        let bad = validate_vehicle_number("XYZ").unwrap_err();
        assert_eq!(bad.message.as_deref(), Some("Invalid vehicle number format"));
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("2025-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert_eq!(
            validate_date("2025-01-15T00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert!(validate_date("15/01/2025").is_err());
    }

    #[test]
    fn test_validate_time() {
        assert_eq!(
            validate_time("14:30:00.123456").unwrap(),
            NaiveTime::from_hms_micro_opt(14, 30, 0, 123456).unwrap()
        );
        assert_eq!(validate_time("09:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert!(validate_time("25:00:00").is_err());
    }

    #[test]
    fn test_validate_datetime() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(validate_datetime("2025-01-15T10:30:00").unwrap(), expected);
        assert_eq!(validate_datetime("2025-01-15 10:30:00").unwrap(), expected);
        assert_eq!(validate_datetime("2025-01-15T10:30:00+05:30").unwrap(), expected);
        assert_eq!(
            validate_datetime("2025-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_time(NaiveTime::MIN)
        );
        assert!(validate_datetime("yesterday").is_err());
    }

    #[test]
    fn test_validate_length() {
        assert!(validate_length("test", 1, 10).is_ok());
        assert!(validate_length("test", 5, 10).is_err());
        assert!(validate_length("test", 1, 3).is_err());
    }

    #[test]
    fn test_document_number() {
        assert!(validate_document_number("INV001").is_ok());
        assert!(validate_document_number("AB").is_err());
    }

    #[test]
    fn test_has_text() {
        assert!(has_text(Some("John")));
        assert!(!has_text(Some("   ")));
        assert!(!has_text(None));
    }
}
