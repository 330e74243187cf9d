//! Integration tests for the approval callback, resync and read endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, UNKNOWN_INSTANCE};
use larkflow_db::repositories::{ApprovalFieldKvRepo, ApprovalInstanceRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_without_instance_code_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/approval/callback", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approval_raw")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_answers_url_verification(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/approval/callback",
        json!({"type": "url_verification", "challenge": "ajls384kdjx98XX", "token": "t"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, json!({"challenge": "ajls384kdjx98XX"}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_persists_every_table(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/approval/callback",
        json!({
            "uuid": "evt-1",
            "type": "event_callback",
            "event": {"type": "approval_instance", "instance_code": "INST-CB", "status": "PENDING"}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["msg"], "received");
    assert!(json["timestamp"].is_string());

    let header = ApprovalInstanceRepo::find_by_code(&pool, "INST-CB")
        .await
        .unwrap()
        .expect("instance header stored");
    assert_eq!(header.status.as_deref(), Some("PENDING"));
    assert_eq!(header.approval_name.as_deref(), Some("采购申请"));
    assert!(header.end_time.is_none());
    assert_eq!(header.update_time, header.start_time);

    // date + contact + 2 rows x 2 cells + formula
    let kv = ApprovalFieldKvRepo::count_for_instance(&pool, "INST-CB").await.unwrap();
    assert_eq!(kv, 7);
}

// ---------------------------------------------------------------------------
// Resync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn resync_is_idempotent_except_for_kv(pool: PgPool) {
    let first = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/approval/instances/INST-RS/sync",
            json!({}),
        )
        .await,
    )
    .await;
    let second = body_json(
        post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/approval/instances/INST-RS/sync",
            json!({}),
        )
        .await,
    )
    .await;

    assert_eq!(first["data"]["instance_id"], second["data"]["instance_id"]);
    assert_eq!(second["data"]["tasks_written"], 1);
    assert_eq!(second["data"]["fields_written"], 4);
    assert_eq!(second["data"]["kv_rows_written"], 7);
    assert_eq!(first["data"]["document"], second["data"]["document"]);

    let instances: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approval_instances")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(instances, 1);

    let fields = body_json(
        get(
            common::build_test_app(pool.clone()),
            "/api/v1/approval/instances/INST-RS/fields",
        )
        .await,
    )
    .await;
    assert_eq!(fields["data"].as_array().unwrap().len(), 4);

    let kv = body_json(
        get(
            common::build_test_app(pool),
            "/api/v1/approval/instances/INST-RS/kv",
        )
        .await,
    )
    .await;
    assert_eq!(kv["data"].as_array().unwrap().len(), 14);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resync_of_unknown_instance_is_bad_gateway(pool: PgPool) {
    let uri = format!("/api/v1/approval/instances/{UNKNOWN_INSTANCE}/sync");
    let response = post_json(common::build_test_app(pool.clone()), &uri, json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");

    let uri = format!("/api/v1/approval/instances/{UNKNOWN_INSTANCE}");
    let response = get(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn instance_detail_includes_tasks(pool: PgPool) {
    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/approval/instances/INST-RD/sync",
        json!({}),
    )
    .await;

    let response = get(
        common::build_test_app(pool),
        "/api/v1/approval/instances/INST-RD",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["instance"]["instance_code"], "INST-RD");
    assert_eq!(json["data"]["instance"]["applicant_user_id"], "u-1");
    assert_eq!(json["data"]["tasks"][0]["task_id"], "t-1");
    assert_eq!(json["data"]["tasks"][0]["node_name"], "主管审批");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn document_is_rebuilt_from_raw_snapshot(pool: PgPool) {
    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/approval/instances/INST-DOC/sync",
        json!({}),
    )
    .await;

    let response = get(
        common::build_test_app(pool),
        "/api/v1/approval/instances/INST-DOC/document",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let doc = &json["data"];
    assert_eq!(doc["application_date"], "2024-03-01");
    assert_eq!(doc["applicant"], json!({"user_id": "ou_123", "open_id": "oi_456"}));
    assert_eq!(doc["total"], 1000);
    assert_eq!(
        doc["line_items"],
        json!([
            {"item_name": "笔记本", "quantity": 3},
            {"item_name": "显示器", "quantity": 5}
        ])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_document_returns_404(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/api/v1/approval/instances/NOPE/document",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}
