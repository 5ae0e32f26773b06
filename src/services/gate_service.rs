//! Servicio de portería
//!
//! Orquesta cada operación: primero las reglas locales (secuencia, ventanas,
//! validación de DTOs) y después la llamada autoritativa al backend. Un
//! rechazo del backend por conflicto se devuelve tal cual, sin reintentar.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};
use validator::Validate;

use crate::client::GateEntryClient;
use crate::dto::gate_dto::{
    BatchGateEntryRequest, BatchGateEntryResponse, EnhancedBatchGateEntryRequest,
    EnhancedManualGateEntryRequest, GateEntryResponse, ManualGateEntryRequest,
    MultipleManualEntryRequest, MultipleManualEntryResponse,
};
use crate::dto::insights_dto::{
    AssignDocumentResponse, MovementFilter, OperationalUpdate, OperationalUpdateResponse,
};
use crate::models::auth::CurrentUser;
use crate::models::document::{Document, RecentDocuments};
use crate::models::edit::EditStatistics;
use crate::models::movement::{MovementRecord, MovementType};
use crate::models::vehicle::VehicleStatus;
use crate::rules::assignment::{check_assignable, mark_assigned};
use crate::rules::edit_state::{can_edit, edit_permission_message};
use crate::rules::gate_sequence::validate_gate_sequence;
use crate::rules::priority::{build_worklist, WorklistItem};
use crate::rules::statistics::edit_statistics;
use crate::rules::submission::{clean_vehicle_number, recommended_action, RecommendedAction};
use crate::utils::errors::{GateError, GateResult};

/// Instante actual en hora local (el backend registra fecha y hora locales)
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Resultado de buscar un vehículo antes de registrar un movimiento
#[derive(Debug, Clone)]
pub struct VehicleLookup {
    pub vehicle_no: String,
    pub status: VehicleStatus,
    pub documents: RecentDocuments,
    pub action: RecommendedAction,
}

/// Marca de envío en curso; se libera al salir de ámbito
struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> GateResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GateError::SubmissionInProgress)?;
        Ok(Self { flag: Arc::clone(flag) })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Servicio de portería sobre `GateEntryClient`
#[derive(Clone)]
pub struct GateService {
    client: GateEntryClient,
    submitting: Arc<AtomicBool>,
}

impl GateService {
    pub fn new(client: GateEntryClient) -> Self {
        Self {
            client,
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn client(&self) -> &GateEntryClient {
        &self.client
    }

    /// Hay un envío en curso
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    // ==================== BÚSQUEDA ====================

    /// Estado del vehículo y documentos recientes, consultados en paralelo
    pub async fn lookup_vehicle(&self, vehicle_no: &str) -> GateResult<VehicleLookup> {
        let vehicle_no = clean_vehicle_number(vehicle_no)?;
        info!("🔍 Buscando vehículo {}", vehicle_no);

        let (status, documents) = futures::try_join!(
            self.client.vehicle_status(&vehicle_no),
            self.client.search_recent_documents(&vehicle_no),
        )?;
        let action = recommended_action(Some(&documents));

        info!(
            "✅ {}: {} documentos, siguiente acción {}",
            vehicle_no,
            documents.count,
            action.action.as_str()
        );
        Ok(VehicleLookup { vehicle_no, status, documents, action })
    }

    /// Comprobar la secuencia contra el estado actual del backend
    async fn check_sequence(&self, vehicle_no: &str, gate_type: MovementType) -> GateResult<()> {
        let status = self.client.vehicle_status(vehicle_no).await?;
        if let Err(e) = validate_gate_sequence(Some(&status), gate_type) {
            warn!("🚫 {} bloqueado para {}: {}", gate_type, vehicle_no, e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Registrar el resultado del envío; los conflictos de secuencia son esperados
    fn log_outcome<T>(operation: &str, vehicle_no: &str, result: &GateResult<T>) {
        match result {
            Ok(_) => info!("✅ {} registrado para {}", operation, vehicle_no),
            Err(e) if e.is_sequence_conflict() => {
                warn!("⚠️ Conflicto de secuencia en {} para {}: {}", operation, vehicle_no, e)
            }
            Err(e) => warn!("❌ {} falló para {}: {}", operation, vehicle_no, e),
        }
    }

    // ==================== ENTRADAS ====================

    pub async fn submit_batch(&self, request: BatchGateEntryRequest) -> GateResult<BatchGateEntryResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        request.validate()?;
        self.check_sequence(&request.vehicle_no, request.gate_type).await?;

        let result = self.client.batch_gate_entry(&request).await;
        Self::log_outcome("batch", &request.vehicle_no, &result);
        result
    }

    pub async fn submit_enhanced_batch(
        &self,
        request: EnhancedBatchGateEntryRequest,
    ) -> GateResult<BatchGateEntryResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        request.validate()?;
        self.check_sequence(&request.vehicle_no, request.gate_type).await?;

        let result = self.client.enhanced_batch_gate_entry(&request).await;
        Self::log_outcome("enhanced batch", &request.vehicle_no, &result);
        result
    }

    pub async fn submit_manual(&self, request: ManualGateEntryRequest) -> GateResult<GateEntryResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        request.validate()?;
        self.check_sequence(&request.vehicle_no, request.gate_type).await?;

        let result = self.client.manual_gate_entry(&request).await;
        Self::log_outcome("manual", &request.vehicle_no, &result);
        result
    }

    pub async fn submit_enhanced_manual(
        &self,
        request: EnhancedManualGateEntryRequest,
    ) -> GateResult<GateEntryResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        request.validate()?;
        self.check_sequence(&request.entry.vehicle_no, request.entry.gate_type)
            .await?;

        let result = self.client.enhanced_manual_gate_entry(&request).await;
        Self::log_outcome("enhanced manual", &request.entry.vehicle_no, &result);
        result
    }

    pub async fn submit_multiple_manual(
        &self,
        request: MultipleManualEntryRequest,
    ) -> GateResult<MultipleManualEntryResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        request.validate()?;
        self.check_sequence(&request.vehicle_no, request.gate_type).await?;

        let result = self.client.multiple_manual_entry(&request).await;
        Self::log_outcome("multiple manual", &request.vehicle_no, &result);
        result
    }

    // ==================== INSIGHTS ====================

    /// Lista de trabajo clasificada y ordenada para el usuario actual
    pub async fn worklist(
        &self,
        filter: &MovementFilter,
        user: &CurrentUser,
        now: NaiveDateTime,
    ) -> GateResult<Vec<WorklistItem>> {
        filter.validate()?;
        let records = self.client.filtered_movements(filter).await?;
        info!("📋 {} movimientos para {}", records.len(), user.username);
        Ok(build_worklist(records, user, now))
    }

    /// Estadísticas calculadas localmente sobre los movimientos filtrados
    pub async fn local_statistics(&self, filter: &MovementFilter, now: NaiveDateTime) -> GateResult<EditStatistics> {
        filter.validate()?;
        let records = self.client.filtered_movements(filter).await?;
        Ok(edit_statistics(&records, now))
    }

    /// Asignar un documento a un placeholder manual dentro de su ventana de 12 horas.
    ///
    /// Si el backend acepta, el registro queda marcado como asignado y un
    /// segundo intento se rechaza sin llamar al backend.
    pub async fn assign_document(
        &self,
        record: &mut MovementRecord,
        document: &Document,
        now: NaiveDateTime,
    ) -> GateResult<AssignDocumentResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        let request = check_assignable(record, &document.document_no, now)?;
        request.validate()?;

        match self.client.assign_document(&request).await {
            Ok(response) => {
                mark_assigned(record, document)?;
                info!("🔗 Documento {} asignado a {}", request.document_no, record.gate_entry_no);
                Ok(response)
            }
            Err(e) => {
                warn!("❌ Asignación rechazada para {}: {}", record.gate_entry_no, e);
                Err(e)
            }
        }
    }

    /// Actualizar datos operativos de un registro editable por el usuario
    pub async fn update_operational(
        &self,
        record: &MovementRecord,
        user: &CurrentUser,
        update: OperationalUpdate,
        now: NaiveDateTime,
    ) -> GateResult<OperationalUpdateResponse> {
        let _guard = InFlight::acquire(&self.submitting)?;
        if !can_edit(record, user, now) {
            return Err(GateError::EditNotAllowed(edit_permission_message(record, user, now)));
        }
        if update.gate_entry_no.trim() != record.gate_entry_no {
            return Err(GateError::BadRequest(format!(
                "Gate entry number mismatch: {}",
                update.gate_entry_no
            )));
        }
        update.validate()?;

        let result = self.client.update_operational_data(&update).await;
        if result.is_ok() {
            info!("✏️ Datos operativos actualizados: {}", record.gate_entry_no);
        }
        result
    }
}
