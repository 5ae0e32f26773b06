//! Services module
//!
//! Este módulo contiene la orquestación de operaciones de portería y el
//! almacenamiento del token de sesión.

pub mod gate_service;
pub mod token_store;

pub use gate_service::{local_now, GateService, VehicleLookup};
pub use token_store::{MemoryTokenStore, TokenStore};
