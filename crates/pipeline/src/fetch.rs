//! Remote instance lookup.

use async_trait::async_trait;
use larkflow_client::{LarkApi, LarkApiError};
use serde_json::Value;

/// Source of full approval instance documents.
#[async_trait]
pub trait InstanceFetcher: Send + Sync {
    /// Return the instance's `data` object exactly as the platform sent it.
    async fn fetch_instance(&self, instance_code: &str) -> Result<Value, LarkApiError>;
}

#[async_trait]
impl InstanceFetcher for LarkApi {
    async fn fetch_instance(&self, instance_code: &str) -> Result<Value, LarkApiError> {
        self.get_instance(instance_code).await
    }
}
