//! Inbound approval event.
//!
//! The callback is only a trigger: the fetched instance is the source of
//! truth. The one required attribute is `instance_code`, read from the top
//! level of the payload or from the nested `event` object of the platform's
//! event envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::instance::lenient_string;

/// The informational subset of an approval callback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CallbackEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub instance_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub approval_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub operate_time: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uuid: Option<String>,
}

impl CallbackEvent {
    /// Read a callback payload. Top-level attributes win over the nested
    /// `event` object; non-object payloads yield an empty event.
    pub fn from_payload(payload: &Value) -> Self {
        let top = Self::read(payload);
        match payload.get("event") {
            Some(nested) => top.or(Self::read(nested)),
            None => top,
        }
    }

    /// An event carrying only an instance code, for manual resyncs.
    pub fn for_instance(instance_code: impl Into<String>) -> Self {
        Self {
            instance_code: Some(instance_code.into()),
            ..Self::default()
        }
    }

    /// The instance code, or a validation error when missing or blank.
    pub fn require_instance_code(&self) -> Result<&str, CoreError> {
        self.instance_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| CoreError::Validation("callback payload is missing instance_code".into()))
    }

    fn read(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }

    fn or(self, other: Self) -> Self {
        Self {
            instance_code: self.instance_code.or(other.instance_code),
            approval_code: self.approval_code.or(other.approval_code),
            status: self.status.or(other.status),
            operate_time: self.operate_time.or(other.operate_time),
            event_type: self.event_type.or(other.event_type),
            uuid: self.uuid.or(other.uuid),
        }
    }
}
