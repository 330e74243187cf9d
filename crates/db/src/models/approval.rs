//! Approval ingestion row models.

use larkflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `approval_raw` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RawApproval {
    pub id: DbId,
    pub instance_code: String,
    pub raw_json: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `approval_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalInstanceRow {
    pub id: DbId,
    pub instance_code: String,
    pub approval_code: Option<String>,
    pub approval_name: Option<String>,
    pub status: Option<String>,
    pub applicant_user_id: Option<String>,
    pub department_id: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub create_time: Option<Timestamp>,
    pub update_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `approval_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalTask {
    pub id: DbId,
    pub instance_code: String,
    pub task_id: String,
    pub node_id: Option<String>,
    pub node_name: Option<String>,
    pub node_type: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub open_id: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `approval_form_fields` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalFormField {
    pub id: DbId,
    pub instance_code: String,
    pub field_id: String,
    pub field_name: String,
    pub field_type: String,
    pub field_value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `approval_field_kv` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalFieldKv {
    pub id: DbId,
    pub approval_id: String,
    pub row_id: Option<String>,
    pub widget_id: String,
    pub field_name: String,
    pub field_type: String,
    pub field_value_text: Option<String>,
    pub field_value_num: Option<f64>,
    pub currency: Option<String>,
    pub extra_json: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
