//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente
//! a los payloads del backend de portería.

pub mod auth;
pub mod document;
pub mod edit;
pub mod movement;
pub mod vehicle;
pub mod wire;

pub use auth::{CurrentUser, JwtClaims, LoginRequest, LoginResponse, UserRole};
pub use document::{AvailableDocuments, Document, RecentDocuments};
pub use edit::{
    ButtonColor, EditAction, EditButtonConfig, EditPriority, EditStatistics, EditStatus,
    OperationalField,
};
pub use movement::{MovementRecord, MovementType};
pub use vehicle::{HistoryStatus, LastMovement, VehicleHistory, VehicleStatus};
