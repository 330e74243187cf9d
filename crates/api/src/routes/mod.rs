pub mod approval;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /approval/callback                               platform callback (POST)
/// /approval/instances/{instance_code}              header + tasks
/// /approval/instances/{instance_code}/sync         manual resync (POST)
/// /approval/instances/{instance_code}/fields       flattened fields
/// /approval/instances/{instance_code}/kv           typed KV rows
/// /approval/instances/{instance_code}/document     normalized document
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/approval", approval::router())
}
