use std::sync::Arc;

use larkflow_pipeline::{ApprovalService, PgApprovalStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used directly by read handlers.
    pub pool: larkflow_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Callback processing pipeline.
    pub approvals: Arc<ApprovalService<PgApprovalStore>>,
}
