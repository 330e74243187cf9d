#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use larkflow_api::config::{LarkConfig, ServerConfig};
use larkflow_api::router::build_app_router;
use larkflow_api::state::AppState;
use larkflow_client::LarkApiError;
use larkflow_pipeline::{ApprovalService, InstanceFetcher, PgApprovalStore};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

/// Instance code the stub fetcher reports as unknown to the platform.
pub const UNKNOWN_INSTANCE: &str = "UNKNOWN-INSTANCE";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://localhost/larkflow_test".to_string(),
        db_max_connections: 5,
        lark: LarkConfig {
            base_url: "http://lark.invalid".to_string(),
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
            http_timeout_secs: 1,
        },
    }
}

/// Serves a purchase-request instance for any code except [`UNKNOWN_INSTANCE`].
pub struct StubFetcher;

#[async_trait]
impl InstanceFetcher for StubFetcher {
    async fn fetch_instance(&self, instance_code: &str) -> Result<Value, LarkApiError> {
        if instance_code == UNKNOWN_INSTANCE {
            return Err(LarkApiError::Business {
                code: 1390001,
                msg: "instance not found".to_string(),
            });
        }
        Ok(purchase_instance(instance_code))
    }
}

pub fn purchase_instance(instance_code: &str) -> Value {
    json!({
        "instance_code": instance_code,
        "approval_code": "APPR-PURCHASE",
        "approval_name": "采购申请",
        "status": "PENDING",
        "user_id": "u-1",
        "department_id": "od-1",
        "start_time": "1700000000000",
        "end_time": "0",
        "task_list": [
            {"id": "t-1", "node_id": "n-1", "node_name": "主管审批", "type": "AND",
             "status": "PENDING", "start_time": "1700000000000", "end_time": "0"}
        ],
        "form": json!([
            {"id": "w0", "name": "申请日期", "type": "date", "value": "2024-03-01"},
            {"id": "w1", "name": "申请人", "type": "contact", "value": ["ou_123"], "open_ids": ["oi_456"]},
            {"id": "w2", "name": "物品明细", "type": "fieldList", "value": [
                [
                    {"id": "n", "name": "物品名称", "type": "input", "value": "笔记本"},
                    {"id": "q", "name": "数量", "type": "number", "value": 3}
                ],
                [
                    {"id": "n", "name": "物品名称", "type": "input", "value": "显示器"},
                    {"id": "q", "name": "数量", "type": "number", "value": 5}
                ]
            ]},
            {"id": "w3", "name": "总金额", "type": "formula", "value": 1000}
        ]).to_string()
    })
}

/// Build the full application router backed by the given pool and the stub fetcher.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let approvals = ApprovalService::new(Arc::new(StubFetcher), PgApprovalStore::new(pool.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        approvals: Arc::new(approvals),
    };

    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
