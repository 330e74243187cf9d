//! Integration tests for the approval repositories.
//!
//! Exercises upsert idempotence on the keyed tables and append-only
//! behaviour of the KV table against a real database.

use chrono::{TimeZone, Utc};
use larkflow_core::flatten::FlattenedField;
use larkflow_core::instance::{InstanceHeader, TaskRecord};
use larkflow_core::kv::KvRow;
use larkflow_db::repositories::{
    ApprovalFieldKvRepo, ApprovalFormFieldRepo, ApprovalInstanceRepo, ApprovalRawRepo,
    ApprovalTaskRepo,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn header(code: &str, status: &str, end_millis: Option<i64>) -> InstanceHeader {
    let start = Utc.timestamp_millis_opt(1_700_000_000_000).single();
    let end = end_millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single());
    InstanceHeader {
        instance_code: code.to_string(),
        approval_code: Some("APPROVAL-DEF".to_string()),
        approval_name: Some("办公用品申请".to_string()),
        status: Some(status.to_string()),
        applicant_user_id: Some("user-1".to_string()),
        department_id: Some("od-1".to_string()),
        start_time: start,
        end_time: end,
        create_time: start,
        update_time: end.or(start),
    }
}

fn task(id: &str, status: &str) -> TaskRecord {
    TaskRecord {
        task_id: id.to_string(),
        node_id: Some(format!("node-{id}")),
        node_name: Some("直属上级".to_string()),
        node_type: Some("AND".to_string()),
        status: Some(status.to_string()),
        user_id: Some("approver-1".to_string()),
        open_id: Some("ou_approver".to_string()),
        start_time: None,
        end_time: None,
    }
}

fn field(id: &str, value: &str) -> FlattenedField {
    FlattenedField {
        field_id: id.to_string(),
        field_name: "事由".to_string(),
        field_type: "textarea".to_string(),
        field_value: value.to_string(),
    }
}

fn kv(code: &str, widget_id: &str, num: Option<f64>) -> KvRow {
    KvRow {
        approval_id: code.to_string(),
        row_id: None,
        widget_id: widget_id.to_string(),
        field_name: "总金额".to_string(),
        field_type: "formula".to_string(),
        field_value_text: num.map(|n| n.to_string()),
        field_value_num: num,
        currency: None,
        extra_json: num.map_or("null".to_string(), |n| n.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Raw documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_raw_upsert_replaces_document(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();

    let first = ApprovalRawRepo::upsert(&mut conn, "INST-1", &json!({"status": "PENDING"}))
        .await
        .unwrap();
    let second = ApprovalRawRepo::upsert(&mut conn, "INST-1", &json!({"status": "APPROVED"}))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let stored = ApprovalRawRepo::find_by_code(&pool, "INST-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.raw_json["status"], "APPROVED");
}

// ---------------------------------------------------------------------------
// Instance headers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_instance_upsert_keeps_identity_and_moves_status(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();

    let created = ApprovalInstanceRepo::upsert(&mut conn, &header("INST-1", "PENDING", None))
        .await
        .unwrap();
    let updated = ApprovalInstanceRepo::upsert(
        &mut conn,
        &header("INST-1", "APPROVED", Some(1_700_000_500_000)),
    )
    .await
    .unwrap();

    assert_eq!(created.id, updated.id);
    assert_eq!(updated.status.as_deref(), Some("APPROVED"));
    assert!(updated.end_time.is_some());
    assert_eq!(updated.update_time, updated.end_time);
    assert_eq!(updated.create_time, created.create_time);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_instance_upsert_is_idempotent(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let input = header("INST-1", "PENDING", None);

    ApprovalInstanceRepo::upsert(&mut conn, &input).await.unwrap();
    ApprovalInstanceRepo::upsert(&mut conn, &input).await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM approval_instances")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);

    let row = ApprovalInstanceRepo::find_by_code(&pool, "INST-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.approval_name.as_deref(), Some("办公用品申请"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_instance(pool: PgPool) {
    let found = ApprovalInstanceRepo::find_by_code(&pool, "NOPE").await.unwrap();
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Tasks and fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_upsert_by_natural_key(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    ApprovalInstanceRepo::upsert(&mut conn, &header("INST-1", "PENDING", None))
        .await
        .unwrap();

    let written = ApprovalTaskRepo::upsert_many(
        &mut conn,
        "INST-1",
        &[task("t1", "PENDING"), task("t2", "PENDING")],
    )
    .await
    .unwrap();
    assert_eq!(written, 2);

    ApprovalTaskRepo::upsert_many(&mut conn, "INST-1", &[task("t1", "APPROVED")])
        .await
        .unwrap();

    let tasks = ApprovalTaskRepo::list_for_instance(&pool, "INST-1").await.unwrap();
    assert_eq!(tasks.len(), 2);
    let t1 = tasks.iter().find(|t| t.task_id == "t1").unwrap();
    assert_eq!(t1.status.as_deref(), Some("APPROVED"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_batches_are_noops(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();

    assert_eq!(ApprovalTaskRepo::upsert_many(&mut conn, "INST-1", &[]).await.unwrap(), 0);
    assert_eq!(ApprovalFormFieldRepo::upsert_many(&mut conn, "INST-1", &[]).await.unwrap(), 0);
    assert_eq!(ApprovalFieldKvRepo::insert_many(&mut conn, &[]).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_form_field_upsert_replaces_value(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    ApprovalInstanceRepo::upsert(&mut conn, &header("INST-1", "PENDING", None))
        .await
        .unwrap();

    ApprovalFormFieldRepo::upsert_many(&mut conn, "INST-1", &[field("w1", "\"a\"")])
        .await
        .unwrap();
    ApprovalFormFieldRepo::upsert_many(&mut conn, "INST-1", &[field("w1", "\"b\"")])
        .await
        .unwrap();

    let fields = ApprovalFormFieldRepo::list_for_instance(&pool, "INST-1")
        .await
        .unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_value, "\"b\"");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_requires_existing_instance(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let result = ApprovalTaskRepo::upsert_many(&mut conn, "ORPHAN", &[task("t1", "PENDING")]).await;
    assert!(result.is_err(), "FK to approval_instances must reject orphan tasks");
}

// ---------------------------------------------------------------------------
// KV rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_kv_rows_are_append_only(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    ApprovalInstanceRepo::upsert(&mut conn, &header("INST-1", "PENDING", None))
        .await
        .unwrap();

    let rows = vec![kv("INST-1", "w1", Some(1000.0)), kv("INST-1", "w2", None)];
    ApprovalFieldKvRepo::insert_many(&mut conn, &rows).await.unwrap();
    ApprovalFieldKvRepo::insert_many(&mut conn, &rows).await.unwrap();

    assert_eq!(
        ApprovalFieldKvRepo::count_for_instance(&pool, "INST-1").await.unwrap(),
        4
    );

    let stored = ApprovalFieldKvRepo::list_for_instance(&pool, "INST-1").await.unwrap();
    assert_eq!(stored[0].field_value_num, Some(1000.0));
    assert_eq!(stored[1].field_value_num, None);
    assert_eq!(stored[1].extra_json, "null");
}
