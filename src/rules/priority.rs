//! Ordenación de listas de trabajo
//!
//! Primero los registros que requieren completar datos (high), luego los
//! editables (medium) y al final los inertes (none). Empates: asignación
//! abierta primero, después el más reciente.

use std::cmp::Reverse;

use chrono::NaiveDateTime;

use super::assignment::{eligibility, AssignmentEligibility};
use super::edit_state::effective_config;
use crate::models::auth::CurrentUser;
use crate::models::edit::EditButtonConfig;
use crate::models::movement::MovementRecord;

/// Fila de la lista de trabajo con sus decisiones ya calculadas
#[derive(Debug, Clone)]
pub struct WorklistItem {
    pub record: MovementRecord,
    pub button: EditButtonConfig,
    pub assignment: AssignmentEligibility,
}

impl WorklistItem {
    pub fn new(record: MovementRecord, user: &CurrentUser, now: NaiveDateTime) -> Self {
        Self {
            button: effective_config(&record, user, now),
            assignment: eligibility(&record, now),
            record,
        }
    }

    /// Clave de orden: prioridad, asignación abierta, más reciente
    fn sort_key(&self) -> (u8, bool, Reverse<Option<NaiveDateTime>>) {
        (
            self.button.priority.value(),
            !self.assignment.is_assignable(),
            Reverse(self.record.recorded_at()),
        )
    }
}

/// Clasificar y ordenar una lista de trabajo.
///
/// La prioridad de edición manda; dentro de la misma prioridad las
/// asignaciones abiertas van primero y después el registro más reciente.
pub fn build_worklist(
    records: Vec<MovementRecord>,
    user: &CurrentUser,
    now: NaiveDateTime,
) -> Vec<WorklistItem> {
    let mut items: Vec<WorklistItem> = records
        .into_iter()
        .map(|record| WorklistItem::new(record, user, now))
        .collect();

    items.sort_by_key(WorklistItem::sort_key);
    items
}
