//! Motor de reglas de movimientos de portería
//!
//! Funciones puras y síncronas: reciben el historial/registro y el instante
//! actual (`now`) y devuelven una decisión. No hacen I/O ni registran logs;
//! el backend sigue siendo la autoridad y re-valida cada operación.

pub mod assignment;
pub mod edit_state;
pub mod gate_sequence;
pub mod operational;
pub mod priority;
pub mod statistics;
pub mod submission;
pub mod windows;

pub use assignment::{AssignmentEligibility, AssignmentError};
pub use edit_state::{classify, effective_config};
pub use gate_sequence::{validate_gate_sequence, GateSequenceError};
pub use operational::{FieldError, KmCheck, KmWarning};
pub use priority::{build_worklist, WorklistItem};
pub use submission::SubmissionError;
pub use windows::Window;
