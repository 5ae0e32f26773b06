//! DTOs de la API de portería

pub mod gate_dto;
pub mod insights_dto;

pub use gate_dto::*;
pub use insights_dto::*;
