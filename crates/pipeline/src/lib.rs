//! Approval ingestion pipeline.
//!
//! [`ApprovalService`] turns one inbound callback into persisted rows:
//! fetch the instance, then store the raw snapshot, header, tasks, flattened
//! fields and KV rows in that order. Remote access and storage sit behind the
//! [`InstanceFetcher`] and [`ApprovalStore`] traits.

pub mod error;
pub mod fetch;
pub mod service;
pub mod store;

pub use error::PipelineError;
pub use fetch::InstanceFetcher;
pub use service::{ApprovalService, ProcessReport};
pub use store::{ApprovalSink, ApprovalStore, PgApprovalSession, PgApprovalStore};
