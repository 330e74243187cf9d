//! Handlers for approval callbacks, manual resyncs and stored-instance reads.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use larkflow_core::callback::CallbackEvent;
use larkflow_core::error::CoreError;
use larkflow_core::form::parse_document;
use larkflow_core::instance::ApprovalInstance;
use larkflow_db::models::approval::{ApprovalInstanceRow, ApprovalTask};
use larkflow_db::repositories::{
    ApprovalFieldKvRepo, ApprovalFormFieldRepo, ApprovalInstanceRepo, ApprovalRawRepo,
    ApprovalTaskRepo,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Event `type` the platform sends when a callback URL is registered.
const URL_VERIFICATION: &str = "url_verification";

/// Header row plus its tasks.
#[derive(Serialize)]
pub struct InstanceDetail {
    pub instance: ApprovalInstanceRow,
    pub tasks: Vec<ApprovalTask>,
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// POST /api/v1/approval/callback
///
/// Answers the platform's URL verification handshake, otherwise processes
/// the event to completion before acknowledging it.
pub async fn callback(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<impl IntoResponse> {
    if payload.get("type").and_then(Value::as_str) == Some(URL_VERIFICATION) {
        tracing::info!("Answering callback URL verification");
        let challenge = payload.get("challenge").cloned().unwrap_or(Value::Null);
        return Ok(Json(json!({ "challenge": challenge })));
    }

    let event = CallbackEvent::from_payload(&payload);
    state.approvals.process(&event).await?;

    Ok(Json(json!({
        "code": 0,
        "msg": "received",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// POST /api/v1/approval/instances/{instance_code}/sync
///
/// Re-fetch and re-persist an instance. Returns the process report.
pub async fn sync_instance(
    State(state): State<AppState>,
    Path(instance_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let report = state.approvals.process_instance_code(&instance_code).await?;

    tracing::info!(
        instance_code = %report.instance_code,
        kv_rows_written = report.kv_rows_written,
        "Manual resync completed",
    );

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/approval/instances/{instance_code}
pub async fn get_instance(
    State(state): State<AppState>,
    Path(instance_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let instance = ApprovalInstanceRepo::find_by_code(&state.pool, &instance_code)
        .await?
        .ok_or_else(|| not_found("Approval instance", &instance_code))?;
    let tasks = ApprovalTaskRepo::list_for_instance(&state.pool, &instance_code).await?;

    Ok(Json(DataResponse {
        data: InstanceDetail { instance, tasks },
    }))
}

/// GET /api/v1/approval/instances/{instance_code}/fields
pub async fn list_fields(
    State(state): State<AppState>,
    Path(instance_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let fields = ApprovalFormFieldRepo::list_for_instance(&state.pool, &instance_code).await?;
    Ok(Json(DataResponse { data: fields }))
}

/// GET /api/v1/approval/instances/{instance_code}/kv
///
/// Every observation ever appended, oldest first.
pub async fn list_kv(
    State(state): State<AppState>,
    Path(instance_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let rows = ApprovalFieldKvRepo::list_for_instance(&state.pool, &instance_code).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/approval/instances/{instance_code}/document
///
/// Rebuild the normalized document from the stored raw snapshot.
pub async fn get_document(
    State(state): State<AppState>,
    Path(instance_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let raw = ApprovalRawRepo::find_by_code(&state.pool, &instance_code)
        .await?
        .ok_or_else(|| not_found("Approval instance", &instance_code))?;

    let instance = ApprovalInstance::from_json(&raw.raw_json)?;
    let document = parse_document(&instance.widgets());

    Ok(Json(DataResponse { data: document }))
}

fn not_found(entity: &'static str, key: &str) -> CoreError {
    CoreError::NotFound {
        entity,
        key: key.to_string(),
    }
}
