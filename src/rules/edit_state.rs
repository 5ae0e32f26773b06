//! Clasificación del estado de edición de un registro
//!
//! Reglas evaluadas en orden estricto, gana la primera que aplica:
//!
//! 1. Expirado: fuera de la ventana de 24h (negro, sólo lectura)
//! 2. Sin acceso: el usuario no es el creador ni Admin (gris)
//! 3. Incompleto: falta algún dato operativo (amarillo, prioridad alta)
//! 4. Completo y editable (verde, prioridad media)
//!
//! Si el backend envía `edit_button_config`, ese valor prevalece.

use chrono::NaiveDateTime;

use super::windows::Window;
use crate::models::auth::CurrentUser;
use crate::models::edit::{
    ButtonColor, EditAction, EditButtonConfig, EditPriority, EditStatus, OperationalField,
};
use crate::models::movement::MovementRecord;
use crate::utils::validation::has_text;

fn field_value(record: &MovementRecord, field: OperationalField) -> Option<&str> {
    match field {
        OperationalField::DriverName => record.driver_name.as_deref(),
        OperationalField::KmReading => record.km_reading.as_deref(),
        OperationalField::LoaderNames => record.loader_names.as_deref(),
    }
}

/// Campos operativos vacíos, en orden fijo: Driver Name, KM Reading, Loader Names
pub fn missing_fields(record: &MovementRecord) -> Vec<OperationalField> {
    OperationalField::ALL
        .into_iter()
        .filter(|field| !has_text(field_value(record, *field)))
        .collect()
}

pub fn is_operational_complete(record: &MovementRecord) -> bool {
    missing_fields(record).is_empty()
}

/// El usuario creó el registro o es Admin
pub fn can_access(record: &MovementRecord, user: &CurrentUser) -> bool {
    user.is_admin()
        || record
            .security_username
            .as_deref()
            .map(|creator| creator.trim() == user.username.trim())
            .unwrap_or(false)
}

/// Dentro de la ventana de edición y con acceso
pub fn can_edit(record: &MovementRecord, user: &CurrentUser, now: NaiveDateTime) -> bool {
    Window::Edit.is_open(record, now) && can_access(record, user)
}

/// Tiempo de edición restante (`"{h}h {m}m"`), `None` si ya expiró
pub fn time_remaining(record: &MovementRecord, now: NaiveDateTime) -> Option<String> {
    Window::Edit.remaining_text(record, now)
}

/// Estado de completitud, independiente del usuario
pub fn edit_status(record: &MovementRecord, now: NaiveDateTime) -> EditStatus {
    if !Window::Edit.is_open(record, now) {
        EditStatus::Expired
    } else if !is_operational_complete(record) {
        EditStatus::NeedsCompletion
    } else {
        EditStatus::Editable
    }
}

/// Calcular localmente la configuración del botón de edición
pub fn classify(record: &MovementRecord, user: &CurrentUser, now: NaiveDateTime) -> EditButtonConfig {
    let remaining = match time_remaining(record, now) {
        Some(remaining) => remaining,
        None => {
            return EditButtonConfig {
                color: ButtonColor::Black,
                text: "⚫ Expired".to_string(),
                enabled: false,
                priority: EditPriority::None,
                message: "Edit window expired (24+ hours)".to_string(),
                action: EditAction::ViewOnly,
                missing_fields: Vec::new(),
                edit_count: None,
            }
        }
    };

    if !can_access(record, user) {
        return EditButtonConfig {
            color: ButtonColor::Gray,
            text: "🚫 No Access".to_string(),
            enabled: false,
            priority: EditPriority::None,
            message: "Only creator or admin can edit".to_string(),
            action: EditAction::NoAccess,
            missing_fields: Vec::new(),
            edit_count: None,
        };
    }

    let missing: Vec<String> = missing_fields(record)
        .iter()
        .map(|field| field.label().to_string())
        .collect();

    if !missing.is_empty() {
        return EditButtonConfig {
            color: ButtonColor::Yellow,
            text: "⚠️ Complete Info".to_string(),
            enabled: true,
            priority: EditPriority::High,
            message: format!("Missing: {} | {} remaining", missing.join(", "), remaining),
            action: EditAction::CompleteRequired,
            missing_fields: missing,
            edit_count: None,
        };
    }

    EditButtonConfig {
        color: ButtonColor::Green,
        text: "✅ Edit Details".to_string(),
        enabled: true,
        priority: EditPriority::Medium,
        message: format!("All data complete | {} remaining", remaining),
        action: EditAction::EditOptional,
        missing_fields: Vec::new(),
        edit_count: Some(record.edit_count),
    }
}

/// Configuración efectiva: la del backend si la envió, si no la calculada localmente
pub fn effective_config(
    record: &MovementRecord,
    user: &CurrentUser,
    now: NaiveDateTime,
) -> EditButtonConfig {
    match &record.edit_button_config {
        Some(config) => config.clone(),
        None => classify(record, user, now),
    }
}

/// Mensaje de permiso de edición para el operador
pub fn edit_permission_message(record: &MovementRecord, user: &CurrentUser, now: NaiveDateTime) -> String {
    match time_remaining(record, now) {
        None => "Edit window expired. Records can only be edited within 24 hours.".to_string(),
        Some(_) if !can_access(record, user) => "You can only edit your own gate entries.".to_string(),
        Some(remaining) => format!("You can edit this record for {} more.", remaining),
    }
}
