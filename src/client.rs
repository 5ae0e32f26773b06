//! Cliente HTTP del backend de portería
//!
//! Un método por endpoint REST. Cada petición adjunta el token bearer del
//! `TokenStore`; un 401 lo elimina para forzar un nuevo login. Los fallos se
//! clasifican con `GateError::from_response` a partir del `detail` del backend.

use std::sync::Arc;

use http::StatusCode;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::environment::EnvironmentConfig;
use crate::dto::gate_dto::{
    BatchGateEntryRequest, BatchGateEntryResponse, EnhancedBatchGateEntryRequest,
    EnhancedManualGateEntryRequest, GateEntryResponse, ManualGateEntryRequest,
    MultipleManualEntryRequest, MultipleManualEntryResponse,
};
use crate::dto::insights_dto::{
    AssignDocumentRequest, AssignDocumentResponse, FilteredMovementsResponse, KmReadingContext,
    MovementFilter, OperationalSummary, OperationalUpdate, OperationalUpdateResponse,
    RecordsNeedingCompletion, UnassignedCount,
};
use crate::models::auth::{CurrentUser, LoginRequest, LoginResponse};
use crate::models::document::{AvailableDocuments, RecentDocuments};
use crate::models::edit::EditStatistics;
use crate::models::movement::MovementRecord;
use crate::models::vehicle::{VehicleHistory, VehicleStatus};
use crate::services::token_store::TokenStore;
use crate::utils::errors::{GateError, GateResult};
use crate::utils::jwt::{
    bearer_header, current_user_from_token, decode_claims, get_token_remaining_time, is_token_expired,
};
use crate::utils::validation::normalize_vehicle_number;

/// Cliente HTTP del backend de portería
#[derive(Clone)]
pub struct GateEntryClient {
    client: Client,
    config: EnvironmentConfig,
    tokens: Arc<dyn TokenStore>,
}

impl GateEntryClient {
    /// Crear nuevo cliente con el timeout configurado
    pub fn new(config: EnvironmentConfig, tokens: Arc<dyn TokenStore>) -> GateResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GateError::Config(format!("Error creando cliente HTTP: {}", e)))?;

        Ok(Self { client, config, tokens })
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn vehicle_path(prefix: &str, vehicle_no: &str) -> String {
        format!("{}/{}", prefix, urlencoding::encode(&normalize_vehicle_number(vehicle_no)))
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.get().await {
            Some(token) => builder.header(http::header::AUTHORIZATION, bearer_header(&token)),
            None => builder,
        }
    }

    /// Convertir una respuesta fallida en `GateError`; 401 elimina el token
    async fn failure(&self, endpoint: &str, response: Response) -> GateError {
        let status = response.status();
        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| match body.get("detail") {
                Some(Value::String(detail)) => Some(detail.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            });

        if status == StatusCode::UNAUTHORIZED {
            warn!("🔒 401 en {}: se elimina el token de acceso", endpoint);
            self.tokens.clear().await;
        } else {
            warn!("❌ {} respondió {}: {:?}", endpoint, status, detail);
        }

        GateError::from_response(status, detail)
    }

    async fn send<T: DeserializeOwned>(&self, endpoint: &str, builder: RequestBuilder) -> GateResult<T> {
        let response = self.authorized(builder).await.send().await?;
        if !response.status().is_success() {
            return Err(self.failure(endpoint, response).await);
        }
        debug!("📥 {} OK", endpoint);
        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GateResult<T> {
        debug!("📤 GET {}", path);
        let builder = self.client.get(self.config.endpoint(path));
        self.send(path, builder).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> GateResult<T> {
        debug!("📤 POST {}", path);
        let builder = self.client.post(self.config.endpoint(path)).json(body);
        self.send(path, builder).await
    }

    async fn put<B: serde::Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> GateResult<T> {
        debug!("📤 PUT {}", path);
        let builder = self.client.put(self.config.endpoint(path)).json(body);
        self.send(path, builder).await
    }

    // ==================== AUTH ====================

    /// Login: guarda el token y devuelve el usuario decodificado de sus claims
    pub async fn login(&self, username: &str, password: &str) -> GateResult<CurrentUser> {
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/login", &request).await?;
        let user = current_user_from_token(&response.access_token)?;
        self.tokens.set(response.access_token).await;

        info!("✅ Login exitoso: {} ({})", user.username, user.role.as_str());
        Ok(user)
    }

    /// Logout: el token local se elimina aunque la llamada al backend falle
    pub async fn logout(&self) -> GateResult<()> {
        if self.tokens.get().await.is_some() {
            if let Err(e) = self.post::<_, Value>("/logout", &serde_json::json!({})).await {
                warn!("⚠️ Logout en backend falló, se limpia el token local: {}", e);
            }
        }
        self.tokens.clear().await;
        info!("👋 Sesión cerrada");
        Ok(())
    }

    /// Usuario de la sesión actual (claims no verificados); un token expirado se descarta
    pub async fn current_user(&self) -> GateResult<Option<CurrentUser>> {
        let Some(token) = self.tokens.get().await else {
            return Ok(None);
        };
        let claims = decode_claims(&token)?;
        if is_token_expired(&claims) {
            info!("⏰ Token expirado para {}, se requiere nuevo login", claims.sub);
            self.tokens.clear().await;
            return Ok(None);
        }
        debug!("🔑 Token válido por {}s más", get_token_remaining_time(&claims));
        Ok(Some(CurrentUser::from(claims)))
    }

    // ==================== VEHÍCULO ====================

    pub async fn vehicle_status(&self, vehicle_no: &str) -> GateResult<VehicleStatus> {
        self.get(&Self::vehicle_path("/vehicle-status", vehicle_no)).await
    }

    pub async fn vehicle_history(&self, vehicle_no: &str) -> GateResult<VehicleHistory> {
        self.get(&Self::vehicle_path("/vehicle-history", vehicle_no)).await
    }

    /// Documentos de las últimas 18 horas; un 404 equivale a cero resultados
    pub async fn search_recent_documents(&self, vehicle_no: &str) -> GateResult<RecentDocuments> {
        match self.get(&Self::vehicle_path("/search-recent-documents", vehicle_no)).await {
            Err(GateError::NotFound(detail)) => {
                debug!("🔍 Sin documentos recientes para {}: {}", vehicle_no, detail);
                Ok(RecentDocuments::empty(&normalize_vehicle_number(vehicle_no)))
            }
            other => other,
        }
    }

    // ==================== ENTRADAS ====================

    pub async fn batch_gate_entry(&self, request: &BatchGateEntryRequest) -> GateResult<BatchGateEntryResponse> {
        self.post("/batch-gate-entry", request).await
    }

    pub async fn enhanced_batch_gate_entry(
        &self,
        request: &EnhancedBatchGateEntryRequest,
    ) -> GateResult<BatchGateEntryResponse> {
        self.post("/enhanced-batch-gate-entry", request).await
    }

    pub async fn manual_gate_entry(&self, request: &ManualGateEntryRequest) -> GateResult<GateEntryResponse> {
        self.post("/manual-gate-entry", request).await
    }

    pub async fn enhanced_manual_gate_entry(
        &self,
        request: &EnhancedManualGateEntryRequest,
    ) -> GateResult<GateEntryResponse> {
        self.post("/enhanced-manual-gate-entry", request).await
    }

    pub async fn multiple_manual_entry(
        &self,
        request: &MultipleManualEntryRequest,
    ) -> GateResult<MultipleManualEntryResponse> {
        self.post("/multiple-manual-entry", request).await
    }

    // ==================== ASIGNACIÓN ====================

    /// Documentos disponibles para asignar; un 404 equivale a ninguno
    pub async fn available_documents(&self, vehicle_no: &str) -> GateResult<AvailableDocuments> {
        match self.get(&Self::vehicle_path("/available-documents", vehicle_no)).await {
            Err(GateError::NotFound(_)) => Ok(AvailableDocuments {
                vehicle_no: Some(normalize_vehicle_number(vehicle_no)),
                ..Default::default()
            }),
            other => other,
        }
    }

    pub async fn assign_document(&self, request: &AssignDocumentRequest) -> GateResult<AssignDocumentResponse> {
        self.post("/assign-document", request).await
    }

    pub async fn unassigned_count(&self) -> GateResult<UnassignedCount> {
        self.get("/unassigned-count").await
    }

    // ==================== INSIGHTS ====================

    pub async fn filtered_movements(&self, filter: &MovementFilter) -> GateResult<Vec<MovementRecord>> {
        let response: FilteredMovementsResponse = self.post("/filtered-movements", filter).await?;
        Ok(response.results)
    }

    pub async fn update_operational_data(
        &self,
        update: &OperationalUpdate,
    ) -> GateResult<OperationalUpdateResponse> {
        self.put("/update-operational-data", update).await
    }

    pub async fn edit_statistics(&self) -> GateResult<EditStatistics> {
        self.get("/edit-statistics").await
    }

    pub async fn km_reading_context(&self, gate_entry_no: &str) -> GateResult<KmReadingContext> {
        self.get(&format!("/km-reading-context/{}", urlencoding::encode(gate_entry_no.trim())))
            .await
    }

    pub async fn records_needing_completion(&self) -> GateResult<RecordsNeedingCompletion> {
        self.get("/records-needing-completion").await
    }

    pub async fn operational_summary(&self) -> GateResult<OperationalSummary> {
        self.get("/operational-summary").await
    }
}
