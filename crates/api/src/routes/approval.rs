use axum::routing::{get, post};
use axum::Router;

use crate::handlers::approval;
use crate::state::AppState;

/// Approval routes, nested under `/approval`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/callback", post(approval::callback))
        .route("/instances/{instance_code}", get(approval::get_instance))
        .route("/instances/{instance_code}/sync", post(approval::sync_instance))
        .route("/instances/{instance_code}/fields", get(approval::list_fields))
        .route("/instances/{instance_code}/kv", get(approval::list_kv))
        .route("/instances/{instance_code}/document", get(approval::get_document))
}
