//! Gate Entry - motor de reglas de movimientos de portería
//!
//! Reglas puras (`rules`) sobre los modelos del backend (`models`, `dto`),
//! más el cliente HTTP tipado (`client`) y la orquestación (`services`)
//! que las aplican antes de cada llamada autoritativa.

pub mod client;
pub mod config;
pub mod dto;
pub mod models;
pub mod rules;
pub mod services;
pub mod utils;

pub use client::GateEntryClient;
pub use config::EnvironmentConfig;
pub use services::{GateService, MemoryTokenStore, TokenStore};
pub use utils::{GateError, GateResult};
