//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: URL del backend,
//! timeout de las peticiones y nivel de log. Nunca se hardcodea en la lógica.

use std::env;
use std::time::Duration;

use tracing::Level;

use crate::utils::errors::{GateError, GateResult};

/// Timeout fijo de las peticiones al backend (segundos)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub log_level: Option<String>,
}

impl EnvironmentConfig {
    /// Configuración explícita (tests, integración embebida)
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: None,
        }
    }

    /// Cargar desde `GATE_ENV`, `GATE_API_BASE_URL`, `GATE_REQUEST_TIMEOUT_SECS` y `GATE_LOG_LEVEL`
    pub fn from_env() -> GateResult<Self> {
        let environment = env::var("GATE_ENV").unwrap_or_else(|_| "development".to_string());

        let api_base_url = env::var("GATE_API_BASE_URL")
            .map_err(|_| GateError::Config("GATE_API_BASE_URL must be set".to_string()))?;
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(GateError::Config(format!(
                "GATE_API_BASE_URL must be an http(s) URL, got '{}'",
                api_base_url
            )));
        }

        let request_timeout_secs = match env::var("GATE_REQUEST_TIMEOUT_SECS") {
            Ok(value) => value.trim().parse().map_err(|_| {
                GateError::Config("GATE_REQUEST_TIMEOUT_SECS must be a valid number".to_string())
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            environment,
            api_base_url,
            request_timeout_secs,
            log_level: env::var("GATE_LOG_LEVEL").ok(),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// URL completa de un endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Nivel de log: el configurado, o DEBUG en desarrollo e INFO en otro caso
    pub fn log_level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(|level| level.trim().parse().ok())
            .unwrap_or(if self.is_development() {
                Level::DEBUG
            } else {
                Level::INFO
            })
    }
}
