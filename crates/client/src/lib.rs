//! Lark / Feishu open-platform client.
//!
//! Covers the two calls ingestion needs: obtaining a tenant access token and
//! fetching one approval instance. Every response goes through the same
//! envelope checks (HTTP status, content type, JSON body, business `code`).

pub mod api;

pub use api::{LarkApi, LarkApiError, LarkClientConfig};
