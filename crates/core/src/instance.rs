//! Approval instance model and the row projections derived from it.
//!
//! [`ApprovalInstance`] mirrors the subset of the platform's instance record
//! that ingestion consumes. Attributes are read leniently: identifiers and
//! timestamps may arrive as strings or numbers, and anything missing becomes
//! `None` instead of a decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::form::decode_form;
use crate::types::Timestamp;
use crate::widget::Widget;

/// Instance status as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Pending,
    Approved,
    Rejected,
    Canceled,
    Deleted,
    /// A status this service does not know about, kept verbatim.
    Other(String),
}

impl InstanceStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "APPROVED" => Self::Approved,
            "REJECTED" => Self::Rejected,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            "DELETED" => Self::Deleted,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Canceled => "CANCELED",
            Self::Deleted => "DELETED",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the instance can no longer change state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Other(_))
    }
}

/// The fetched approval instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalInstance {
    #[serde(default, deserialize_with = "lenient_string")]
    pub instance_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub approval_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub approval_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// Applicant user id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub open_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serial_number: Option<String>,
    /// Millisecond epoch, as sent by the platform.
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_tasks")]
    pub task_list: Vec<TaskNode>,
    /// JSON-encoded string or decoded array of widgets.
    #[serde(default)]
    pub form: Option<Value>,
}

/// One approval workflow step from `task_list`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskNode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub node_name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub open_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: Option<String>,
}

impl ApprovalInstance {
    /// Decode the `data` object returned by the instance API.
    pub fn from_json(data: &Value) -> Result<Self, CoreError> {
        Self::deserialize(data)
            .map_err(|e| CoreError::Validation(format!("Invalid approval instance: {e}")))
    }

    /// The instance's form as widgets. Undecodable forms yield an empty list.
    pub fn widgets(&self) -> Vec<Widget> {
        decode_form(self.form.as_ref())
    }
}

impl TaskNode {
    /// Natural key of the task: `id`, falling back to `node_id`.
    pub fn task_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.node_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Projection stored in `approval_instances`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceHeader {
    pub instance_code: String,
    pub approval_code: Option<String>,
    pub approval_name: Option<String>,
    pub status: Option<String>,
    pub applicant_user_id: Option<String>,
    pub department_id: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    /// Platform creation time (the instance start time).
    pub create_time: Option<Timestamp>,
    /// Last platform update: end time, falling back to start time.
    pub update_time: Option<Timestamp>,
}

impl InstanceHeader {
    /// Project the header row. `requested_code` is used when the fetched
    /// record omits its own code.
    pub fn project(requested_code: &str, instance: &ApprovalInstance) -> Self {
        let start_time = instance.start_time.as_deref().and_then(parse_platform_time);
        let end_time = instance.end_time.as_deref().and_then(parse_platform_time);

        Self {
            instance_code: instance
                .instance_code
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| requested_code.to_string()),
            approval_code: instance.approval_code.clone(),
            approval_name: instance.approval_name.clone(),
            status: instance
                .status
                .as_deref()
                .map(|s| InstanceStatus::parse(s).as_str().to_string()),
            applicant_user_id: instance.user_id.clone(),
            department_id: instance.department_id.clone(),
            start_time,
            end_time,
            create_time: start_time,
            update_time: end_time.or(start_time),
        }
    }
}

/// Projection stored in `approval_tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub node_id: Option<String>,
    pub node_name: Option<String>,
    pub node_type: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub open_id: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

impl TaskRecord {
    /// Project a task row. Returns `None` for tasks without any id.
    pub fn from_node(node: &TaskNode) -> Option<Self> {
        let task_id = node.task_id()?.to_string();
        Some(Self {
            task_id,
            node_id: node.node_id.clone(),
            node_name: node.node_name.clone(),
            node_type: node.node_type.clone(),
            status: node.status.clone(),
            user_id: node.user_id.clone(),
            open_id: node.open_id.clone(),
            start_time: node.start_time.as_deref().and_then(parse_platform_time),
            end_time: node.end_time.as_deref().and_then(parse_platform_time),
        })
    }
}

/// Parse a platform timestamp.
///
/// The platform sends millisecond epochs as strings; `"0"` and empty strings
/// mean "not set". RFC 3339 strings are accepted as well.
pub fn parse_platform_time(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = raw.parse().ok()?;
        return DateTime::<Utc>::from_timestamp_millis(millis);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accept strings, numbers and booleans as text; `null` and composites become `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Decode `task_list`, dropping elements that are not task objects.
fn lenient_tasks<'de, D>(deserializer: D) -> Result<Vec<TaskNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| TaskNode::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
