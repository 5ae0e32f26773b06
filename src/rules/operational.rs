//! Validación de datos operativos
//!
//! Conductor, lectura de KM y cargadores: los tres campos que un registro
//! necesita para considerarse completo. Cada validador devuelve el valor
//! normalizado o un `FieldError` cuyo `Display` es el mensaje para el operador.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;
use validator::ValidationError;

use crate::dto::insights_dto::SuggestedRange;
use crate::models::edit::OperationalField;
use crate::models::movement::MovementType;

pub const KM_MAX: u32 = 999_999;
/// Distancia máxima razonable entre dos lecturas consecutivas
pub const MAX_DISTANCE_KM: u32 = 500;
pub const MAX_LOADERS: usize = 10;

/// Rechazo de un campo operativo
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Driver name is required for completion")]
    DriverNameRequired,
    #[error("Driver name must be 2-50 characters")]
    DriverNameLength,

    #[error("KM reading is required for completion")]
    KmReadingRequired,
    #[error("KM reading must be numeric only")]
    KmReadingNotNumeric,
    #[error("KM reading must be 3-6 digits")]
    KmReadingLength,
    #[error("KM reading must be between 0 and 999,999")]
    KmReadingOutOfRange,

    #[error("Loader names are required for completion")]
    LoaderNamesRequired,
    #[error("At least one loader name is required")]
    NoLoaderNames,
    #[error("Maximum 10 loader names allowed")]
    TooManyLoaders,
    #[error("Each loader name must be at least 2 characters")]
    LoaderNameTooShort,
}

impl FieldError {
    pub fn field(&self) -> OperationalField {
        match self {
            FieldError::DriverNameRequired | FieldError::DriverNameLength => OperationalField::DriverName,
            FieldError::KmReadingRequired
            | FieldError::KmReadingNotNumeric
            | FieldError::KmReadingLength
            | FieldError::KmReadingOutOfRange => OperationalField::KmReading,
            FieldError::LoaderNamesRequired
            | FieldError::NoLoaderNames
            | FieldError::TooManyLoaders
            | FieldError::LoaderNameTooShort => OperationalField::LoaderNames,
        }
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Nombre del conductor: 2-50 caracteres tras recortar
pub fn validate_driver_name(value: Option<&str>) -> Result<String, FieldError> {
    let name = required(value).ok_or(FieldError::DriverNameRequired)?;
    let len = name.chars().count();
    if !(2..=50).contains(&len) {
        return Err(FieldError::DriverNameLength);
    }
    Ok(name.to_string())
}

/// Lectura de KM: sólo dígitos, 3-6 dígitos, valor en `[0, 999999]`
pub fn validate_km_reading(value: Option<&str>) -> Result<u32, FieldError> {
    let reading = required(value).ok_or(FieldError::KmReadingRequired)?;
    if !reading.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::KmReadingNotNumeric);
    }
    if !(3..=6).contains(&reading.len()) {
        return Err(FieldError::KmReadingLength);
    }
    match reading.parse::<u32>() {
        Ok(km) if km <= KM_MAX => Ok(km),
        _ => Err(FieldError::KmReadingOutOfRange),
    }
}

/// Cargadores: lista separada por comas, 1-10 nombres de al menos 2 caracteres.
/// Los segmentos vacíos se descartan.
pub fn validate_loader_names(value: Option<&str>) -> Result<Vec<String>, FieldError> {
    let raw = required(value).ok_or(FieldError::LoaderNamesRequired)?;
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(FieldError::NoLoaderNames);
    }
    if names.len() > MAX_LOADERS {
        return Err(FieldError::TooManyLoaders);
    }
    if names.iter().any(|name| name.chars().count() < 2) {
        return Err(FieldError::LoaderNameTooShort);
    }
    Ok(names)
}

/// Cargadores validados con el formato que guarda el backend (`"a, b, c"`)
pub fn normalize_loader_names(value: Option<&str>) -> Result<String, FieldError> {
    validate_loader_names(value).map(|names| names.join(", "))
}

/// Tipo de lectura según la dirección del movimiento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmReadingType {
    KmIn,
    KmOut,
}

impl KmReadingType {
    pub fn for_movement(movement_type: MovementType) -> Self {
        match movement_type {
            MovementType::GateIn => KmReadingType::KmIn,
            MovementType::GateOut => KmReadingType::KmOut,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KmReadingType::KmIn => "km_in",
            KmReadingType::KmOut => "km_out",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KmReadingType::KmIn => "KM IN Reading *",
            KmReadingType::KmOut => "KM OUT Reading *",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            KmReadingType::KmIn => "Enter KM IN (arrival reading)",
            KmReadingType::KmOut => "Enter KM OUT (departure reading)",
        }
    }
}

/// Aviso no bloqueante: el operador debe confirmar la lectura
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmWarning {
    LowerThanPrevious { new: u32, previous: u32 },
    UnusuallyHigh { distance: u32 },
}

impl fmt::Display for KmWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KmWarning::LowerThanPrevious { new, previous } => write!(
                f,
                "New KM ({}) is less than previous reading ({}). Please verify.",
                new, previous
            ),
            KmWarning::UnusuallyHigh { distance } => {
                write!(f, "Distance of {}km seems unusually high. Please verify.", distance)
            }
        }
    }
}

/// Resultado de comparar una lectura con la anterior del mismo vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmCheck {
    /// Sin lectura anterior conocida o recorrido razonable
    Accepted { distance: Option<u32> },
    NeedsConfirmation(KmWarning),
}

impl KmCheck {
    pub fn warning(&self) -> Option<KmWarning> {
        match self {
            KmCheck::Accepted { .. } => None,
            KmCheck::NeedsConfirmation(warning) => Some(*warning),
        }
    }
}

fn parse_km(value: Option<&str>) -> Option<u32> {
    required(value).and_then(|v| v.parse().ok())
}

/// Comparar la nueva lectura con la anterior: menor o con más de 500 km de
/// diferencia requiere confirmación, nunca es un rechazo.
pub fn check_against_previous(new_reading: Option<&str>, previous_reading: Option<&str>) -> KmCheck {
    let (new, previous) = match (parse_km(new_reading), parse_km(previous_reading)) {
        (Some(new), Some(previous)) => (new, previous),
        _ => return KmCheck::Accepted { distance: None },
    };

    if new < previous {
        return KmCheck::NeedsConfirmation(KmWarning::LowerThanPrevious { new, previous });
    }
    let distance = new - previous;
    if distance > MAX_DISTANCE_KM {
        return KmCheck::NeedsConfirmation(KmWarning::UnusuallyHigh { distance });
    }
    KmCheck::Accepted { distance: Some(distance) }
}

/// Rango sugerido: `[anterior, anterior + 500]` o el rango completo sin historial
pub fn suggested_range(previous_reading: Option<&str>) -> SuggestedRange {
    match parse_km(previous_reading) {
        Some(previous) => SuggestedRange {
            min: previous,
            max: previous.saturating_add(MAX_DISTANCE_KM).min(KM_MAX),
        },
        None => SuggestedRange { min: 0, max: KM_MAX },
    }
}

/// Lectura con separadores de miles (`"123456"` → `"123,456"`); `"--"` si no hay
pub fn format_km_display(value: Option<&str>) -> String {
    let Some(reading) = required(value) else {
        return "--".to_string();
    };
    if !reading.chars().all(|c| c.is_ascii_digit()) {
        return reading.to_string();
    }

    let len = reading.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in reading.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn to_validation_error(err: FieldError) -> ValidationError {
    let mut error = ValidationError::new(err.field().key());
    error.message = Some(Cow::Owned(err.to_string()));
    error
}

/// Adaptadores para `#[validate(custom = ...)]` en los DTOs
pub fn validate_driver_name_field(value: &str) -> Result<(), ValidationError> {
    validate_driver_name(Some(value)).map(|_| ()).map_err(to_validation_error)
}

pub fn validate_km_reading_field(value: &str) -> Result<(), ValidationError> {
    validate_km_reading(Some(value)).map(|_| ()).map_err(to_validation_error)
}

pub fn validate_loader_names_field(value: &str) -> Result<(), ValidationError> {
    validate_loader_names(Some(value)).map(|_| ()).map_err(to_validation_error)
}
