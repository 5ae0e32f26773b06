use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveDateTime};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use gate_entry::dto::gate_dto::BatchGateEntryRequest;
use gate_entry::dto::insights_dto::MovementFilter;
use gate_entry::models::auth::{CurrentUser, UserRole};
use gate_entry::models::document::Document;
use gate_entry::models::movement::{MovementRecord, MovementType, MANUAL_ENTRY, PENDING_ASSIGNMENT};
use gate_entry::rules::gate_sequence::GateSequenceError;
use gate_entry::rules::AssignmentError;
use gate_entry::{EnvironmentConfig, GateEntryClient, GateError, GateService, MemoryTokenStore, TokenStore};

const CONFLICT: &str = "Vehicle MH12AB1234 already has Gate-In on 2024-01-15. Must do Gate-Out first.";

// Levantar el backend simulado en un puerto libre
async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: &str, store: &MemoryTokenStore) -> GateEntryClient {
    GateEntryClient::new(EnvironmentConfig::new(base_url), Arc::new(store.clone())).unwrap()
}

fn token_for(username: &str, role: &str) -> String {
    let claims = json!({
        "sub": username,
        "role": role,
        "first_name": "Ravi",
        "last_name": "Kumar",
        "exp": chrono::Utc::now().timestamp() + 3600
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-secret")).unwrap()
}

fn status_after(last: &str) -> Value {
    json!({
        "vehicle_no": "MH12AB1234",
        "status": "active",
        "last_movement": {"type": last, "date": "2024-01-15", "time": "08:00:00", "gate_entry_no": "GE1"},
        "can_gate_in": last == "Gate-Out",
        "can_gate_out": last == "Gate-In"
    })
}

fn batch_request(gate_type: MovementType) -> BatchGateEntryRequest {
    BatchGateEntryRequest {
        gate_type,
        vehicle_no: "MH12AB1234".to_string(),
        document_nos: vec!["INV-1".to_string()],
        remarks: None,
    }
}

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[tokio::test]
async fn test_login_stores_token_and_decodes_user() {
    let token = token_for("guard1", "SecurityGuard");
    let issued = token.clone();
    let app = Router::new().route(
        "/login",
        post(move |Json(body): Json<Value>| {
            let issued = issued.clone();
            async move {
                assert_eq!(body["username"], "guard1");
                Json(json!({"access_token": issued, "token_type": "bearer"}))
            }
        }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::new();
    let client = client_for(&base, &store);

    let user = client.login(" guard1 ", "secret").await.unwrap();

    assert_eq!(user.username, "guard1");
    assert_eq!(user.role, UserRole::SecurityGuard);
    assert_eq!(store.get().await, Some(token));
}

#[tokio::test]
async fn test_bearer_header_is_attached() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let app = Router::new().route(
        "/vehicle-status/:vehicle_no",
        get(move |headers: HeaderMap, Path(vehicle_no): Path<String>| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                assert_eq!(vehicle_no, "MH12AB1234");
                Json(status_after("Gate-Out"))
            }
        }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");

    let status = client_for(&base, &store).vehicle_status("mh12 ab 1234").await.unwrap();

    assert!(status.can_gate_in);
    assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer abc.def.ghi"));
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let app = Router::new().route(
        "/edit-statistics",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Could not validate credentials"})),
            )
        }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");

    let err = client_for(&base, &store).edit_statistics().await.unwrap_err();

    assert!(err.requires_login());
    assert_eq!(err.user_message(), "Authentication failed. Please login again.");
    assert_eq!(store.get().await, None);
}

#[tokio::test]
async fn test_not_found_search_means_zero_documents() {
    let app = Router::new().route(
        "/search-recent-documents/:vehicle_no",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"detail": "No recent documents found for vehicle MH12AB1234"})),
            )
        }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");

    let result = client_for(&base, &store)
        .search_recent_documents("MH12AB1234")
        .await
        .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.documents.is_empty());
    assert_eq!(result.vehicle_no, "MH12AB1234");
    // Un 404 no invalida la sesión
    assert!(store.get().await.is_some());
}

#[tokio::test]
async fn test_backend_conflict_is_surfaced_verbatim() {
    // Snapshot local desactualizado: permite Gate-In, pero otro dispositivo ya lo registró
    let app = Router::new()
        .route("/vehicle-status/:vehicle_no", get(|| async { Json(status_after("Gate-Out")) }))
        .route(
            "/batch-gate-entry",
            post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"detail": CONFLICT}))) }),
        );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");
    let service = GateService::new(client_for(&base, &store));

    let err = service.submit_batch(batch_request(MovementType::GateIn)).await.unwrap_err();

    assert!(err.is_sequence_conflict());
    assert_eq!(err.user_message(), CONFLICT);
    assert!(!service.is_submitting());
}

#[tokio::test]
async fn test_service_blocks_illegal_sequence_without_submitting() {
    let posts = Arc::new(AtomicUsize::new(0));
    let counter = posts.clone();
    let app = Router::new()
        .route("/vehicle-status/:vehicle_no", get(|| async { Json(status_after("Gate-In")) }))
        .route(
            "/batch-gate-entry",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({}))
                }
            }),
        );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");
    let service = GateService::new(client_for(&base, &store));

    let err = service.submit_batch(batch_request(MovementType::GateIn)).await.unwrap_err();

    assert!(matches!(
        err,
        GateError::Sequence(GateSequenceError::AlreadyGateIn { ref date }) if date == "2024-01-15"
    ));
    assert_eq!(
        err.user_message(),
        "Vehicle already has Gate-In (2024-01-15). Must do Gate-Out first."
    );
    assert_eq!(posts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batch_submission_succeeds_when_sequence_allows_it() {
    let app = Router::new()
        .route("/vehicle-status/:vehicle_no", get(|| async { Json(status_after("Gate-In")) }))
        .route(
            "/batch-gate-entry",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["gate_type"], "Gate-Out");
                Json(json!({
                    "message": "Gate-Out recorded",
                    "gate_entry_no": "GE2",
                    "records_processed": 1,
                    "total_requested": 1,
                    "processed_documents": [
                        {"document_no": "INV-1", "document_type": "Invoice", "status": "success"}
                    ],
                    "date": "2024-01-15",
                    "vehicle_no": "MH12AB1234",
                    "movement_type": "Gate-Out"
                }))
            }),
        );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");
    let service = GateService::new(client_for(&base, &store));

    let result = service.submit_batch(batch_request(MovementType::GateOut)).await.unwrap();

    assert_eq!(result.gate_entry_no, "GE2");
    assert_eq!(result.records_processed, 1);
    assert!(result.processed_documents.iter().all(|d| !d.is_error()));
}

#[tokio::test]
async fn test_invalid_batch_is_rejected_before_any_call() {
    // Sin rutas: cualquier llamada devolvería 404
    let base = spawn_backend(Router::new()).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");
    let service = GateService::new(client_for(&base, &store));

    let mut request = batch_request(MovementType::GateIn);
    request.document_nos.clear();

    let err = service.submit_batch(request).await.unwrap_err();
    assert!(matches!(err, GateError::Validation(_)));
    assert!(err.user_message().contains("Please select at least one document"));
}

#[tokio::test]
async fn test_logout_clears_token_even_when_backend_fails() {
    let app = Router::new().route(
        "/logout",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"}))) }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");

    client_for(&base, &store).logout().await.unwrap();

    assert_eq!(store.get().await, None);
}

#[tokio::test]
async fn test_accepted_assignment_is_not_sent_twice() {
    let posts = Arc::new(AtomicUsize::new(0));
    let counter = posts.clone();
    let app = Router::new().route(
        "/assign-document",
        post(move |Json(body): Json<Value>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                assert_eq!(body["insights_record_id"], 42);
                Json(json!({
                    "message": "Document assigned",
                    "insights_record_id": 42,
                    "document_no": body["document_no"]
                }))
            }
        }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");
    let service = GateService::new(client_for(&base, &store));

    let mut record = MovementRecord {
        id: 42,
        gate_entry_no: "GE-MANUAL".to_string(),
        vehicle_no: "MH12AB1234".to_string(),
        movement_type: MovementType::GateIn,
        date: Some(at(15, 8, 0).date()),
        time: Some(at(15, 8, 0).time()),
        document_type: Some(MANUAL_ENTRY.to_string()),
        sub_document_type: Some(PENDING_ASSIGNMENT.to_string()),
        security_username: Some("guard1".to_string()),
        ..Default::default()
    };
    let document = Document {
        document_no: "INV001".to_string(),
        document_type: Some("Invoice".to_string()),
        vehicle_no: Some("MH12AB1234".to_string()),
        ..Default::default()
    };
    let now = at(15, 9, 0);

    let response = service.assign_document(&mut record, &document, now).await.unwrap();
    assert_eq!(response.document_no.as_deref(), Some("INV001"));
    assert_eq!(record.document_no.as_deref(), Some("INV001"));
    assert_eq!(record.edit_count, 1);

    let err = service.assign_document(&mut record, &document, now).await.unwrap_err();
    assert!(matches!(err, GateError::Assignment(AssignmentError::AlreadyAssigned)));
    assert_eq!(posts.load(Ordering::SeqCst), 1);
    assert!(!service.is_submitting());
}

#[tokio::test]
async fn test_worklist_puts_open_assignments_first() {
    let app = Router::new().route(
        "/filtered-movements",
        post(|| async {
            Json(json!({
                "results": [
                    {
                        "id": 1, "gate_entry_no": "GE-COMPLETE", "vehicle_no": "MH12AB1234",
                        "movement_type": "Gate-In", "date": "2024-01-15", "time": "09:00:00",
                        "document_no": "INV-1", "driver_name": "Ravi", "km_reading": "1200",
                        "loader_names": "A, B", "security_username": "guard1", "edit_count": null
                    },
                    {
                        "id": 2, "gate_entry_no": "GE-INCOMPLETE", "vehicle_no": "MH12AB1234",
                        "movement_type": "Gate-Out", "date": "2024-01-15", "time": "10:00:00",
                        "document_no": "INV-2", "security_username": "guard1", "edit_count": 0
                    },
                    {
                        "id": 3, "gate_entry_no": "GE-MANUAL", "vehicle_no": "KA01MN5678",
                        "movement_type": "Gate-In", "date": "2024-01-15", "time": "08:00:00",
                        "document_type": "Manual Entry", "sub_document_type": "Pending Assignment",
                        "document_no": null, "security_username": "guard1", "edit_count": 0
                    }
                ]
            }))
        }),
    );
    let base = spawn_backend(app).await;
    let store = MemoryTokenStore::with_token("abc.def.ghi");
    let service = GateService::new(client_for(&base, &store));
    let user = CurrentUser {
        username: "guard1".to_string(),
        role: UserRole::SecurityGuard,
        first_name: String::new(),
        last_name: String::new(),
        warehouse_code: None,
        site_code: None,
    };

    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let items = service
        .worklist(&MovementFilter::for_day(day), &user, at(15, 12, 0))
        .await
        .unwrap();

    let order: Vec<&str> = items.iter().map(|i| i.record.gate_entry_no.as_str()).collect();
    assert_eq!(order, vec!["GE-MANUAL", "GE-INCOMPLETE", "GE-COMPLETE"]);
    assert!(items[0].assignment.is_assignable());
}
