//! Estadísticas de edición calculadas localmente sobre una lista de registros

use chrono::{Duration, NaiveDateTime};

use super::assignment::{is_assignment_window_open, needs_assignment};
use super::edit_state::{edit_status, missing_fields};
use super::windows::Window;
use crate::models::edit::{EditStatistics, EditStatus, OperationalField};
use crate::models::movement::MovementRecord;

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Agregar el estado de edición de una lista de registros
pub fn edit_statistics(records: &[MovementRecord], now: NaiveDateTime) -> EditStatistics {
    let mut stats = EditStatistics {
        total_records: records.len(),
        ..Default::default()
    };
    if records.is_empty() {
        return stats;
    }

    let mut total_edits: u64 = 0;
    for record in records {
        match edit_status(record, now) {
            EditStatus::NeedsCompletion => stats.needs_completion += 1,
            EditStatus::Editable => stats.complete_and_editable += 1,
            EditStatus::Expired => stats.expired += 1,
        }

        if Window::Edit.is_open(record, now) {
            if let Some(elapsed) = Window::elapsed(record, now) {
                if elapsed <= Duration::hours(6) {
                    stats.within_6_hours += 1;
                } else if elapsed <= Duration::hours(12) {
                    stats.within_12_hours += 1;
                } else {
                    stats.within_24_hours += 1;
                }
            }
        }

        for field in missing_fields(record) {
            match field {
                OperationalField::DriverName => stats.missing_driver += 1,
                OperationalField::KmReading => stats.missing_km += 1,
                OperationalField::LoaderNames => stats.missing_loaders += 1,
            }
        }

        if record.last_edited_at.map(|at| at.date()) == Some(now.date()) {
            stats.edited_today += 1;
        }
        total_edits += u64::from(record.edit_count);
    }

    let complete = stats.complete_and_editable + stats.expired;
    stats.completion_percentage = round_one_decimal(complete as f64 * 100.0 / records.len() as f64);
    stats.avg_edits_per_record = round_one_decimal(total_edits as f64 / records.len() as f64);
    stats.most_edited_record = records
        .iter()
        .filter(|r| r.edit_count > 0)
        .max_by_key(|r| r.edit_count)
        .map(|r| r.gate_entry_no.clone());

    stats
}

/// Placeholders que todavía pueden recibir un documento
pub fn unassigned_count(records: &[MovementRecord], now: NaiveDateTime) -> usize {
    records
        .iter()
        .filter(|r| needs_assignment(r) && is_assignment_window_open(r, now))
        .count()
}
