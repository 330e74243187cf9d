use larkflow_client::LarkApiError;
use larkflow_core::error::CoreError;

/// Errors raised while processing an approval callback.
///
/// Steps that completed before the failure stay committed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The callback or fetched instance was unusable.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The instance could not be fetched from the platform.
    #[error("Failed to fetch approval instance {instance_code}: {source}")]
    Fetch {
        instance_code: String,
        #[source]
        source: LarkApiError,
    },

    /// A storage step failed; later steps were not attempted.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}
