//! Almacenamiento del token de acceso
//!
//! El almacenamiento seguro en dispositivo queda fuera del cliente; este
//! módulo sólo define la interfaz y una implementación en memoria.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

/// Operaciones sobre el token persistido
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Option<String>;
    async fn set(&self, token: String);
    async fn clear(&self);
}

/// Token en memoria (se pierde al cerrar el proceso)
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store con un token ya cargado
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn set(&self, token: String) {
        debug!("💾 Token de acceso guardado");
        *self.token.write().await = Some(token);
    }

    async fn clear(&self) {
        debug!("🗑️ Token de acceso eliminado");
        self.token.write().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get().await, None);

        store.set("abc".to_string()).await;
        assert_eq!(store.get().await.as_deref(), Some("abc"));

        let shared = store.clone();
        shared.clear().await;
        assert_eq!(store.get().await, None);
    }
}
