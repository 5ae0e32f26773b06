//! Ventanas de tiempo de un registro
//!
//! Aritmética compartida por la edición (24h) y la asignación (12h).
//! Los límites son exclusivos: una ventana está abierta si `elapsed < window`.
//! Un registro sin timestamp legible se considera fuera de toda ventana.

use chrono::{Duration, NaiveDateTime};

use crate::models::movement::MovementRecord;

/// Ventanas de tiempo del flujo de portería
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Edición de datos operativos
    Edit,
    /// Asignación de un documento real a un placeholder
    Assignment,
}

impl Window {
    pub fn hours(&self) -> i64 {
        match self {
            Window::Edit => 24,
            Window::Assignment => 12,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(self.hours())
    }

    /// Tiempo transcurrido desde la creación; `None` si el registro no tiene timestamp
    pub fn elapsed(record: &MovementRecord, now: NaiveDateTime) -> Option<Duration> {
        record.recorded_at().map(|created| now - created)
    }

    /// Tiempo restante; cero o negativo significa cerrada
    pub fn remaining(&self, record: &MovementRecord, now: NaiveDateTime) -> Option<Duration> {
        Self::elapsed(record, now).map(|elapsed| self.duration() - elapsed)
    }

    pub fn is_open(&self, record: &MovementRecord, now: NaiveDateTime) -> bool {
        self.remaining(record, now)
            .map(|remaining| remaining > Duration::zero())
            .unwrap_or(false)
    }

    /// `"{h}h {m}m"` restantes, o `None` si la ventana está cerrada
    pub fn remaining_text(&self, record: &MovementRecord, now: NaiveDateTime) -> Option<String> {
        self.remaining(record, now)
            .filter(|remaining| *remaining > Duration::zero())
            .map(format_remaining)
    }
}

/// Formatear una duración como `"{h}h {m}m"`, truncando a minutos enteros
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_at(h: u32, m: u32) -> MovementRecord {
        MovementRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 15),
            time: chrono::NaiveTime::from_hms_opt(h, m, 0),
            ..Default::default()
        }
    }

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_edit_window_boundary_is_exclusive() {
        let record = record_at(8, 0);
        assert!(Window::Edit.is_open(&record, at(16, 7, 59)));
        assert!(!Window::Edit.is_open(&record, at(16, 8, 0)));
        assert!(!Window::Edit.is_open(&record, at(17, 8, 0)));
    }

    #[test]
    fn test_assignment_window_boundary_is_exclusive() {
        let record = record_at(8, 0);
        assert!(Window::Assignment.is_open(&record, at(15, 19, 59)));
        assert!(!Window::Assignment.is_open(&record, at(15, 20, 0)));
    }

    #[test]
    fn test_remaining_text() {
        let record = record_at(8, 0);
        assert_eq!(
            Window::Edit.remaining_text(&record, at(15, 10, 30)).as_deref(),
            Some("21h 30m")
        );
        assert_eq!(Window::Edit.remaining_text(&record, at(16, 9, 0)), None);
    }

    #[test]
    fn test_remaining_floors_to_minutes() {
        assert_eq!(format_remaining(Duration::seconds(59)), "0h 0m");
        assert_eq!(format_remaining(Duration::seconds(3 * 3600 + 125)), "3h 2m");
        assert_eq!(format_remaining(Duration::seconds(-10)), "0h 0m");
    }

    #[test]
    fn test_missing_timestamp_is_closed() {
        let record = MovementRecord::default();
        assert!(!Window::Edit.is_open(&record, at(15, 8, 0)));
        assert!(Window::Edit.remaining(&record, at(15, 8, 0)).is_none());
    }
}
