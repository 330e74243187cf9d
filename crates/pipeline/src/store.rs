//! Storage seam for the pipeline.
//!
//! An [`ApprovalStore`] hands out one [`ApprovalSink`] per processing run.
//! The Postgres implementation backs each sink with a single pooled
//! connection that returns to the pool when the sink is dropped, whether
//! the run finished or bailed out early. Every sink call commits on its own.

use async_trait::async_trait;
use larkflow_core::flatten::FlattenedField;
use larkflow_core::instance::{InstanceHeader, TaskRecord};
use larkflow_core::kv::KvRow;
use larkflow_core::types::DbId;
use larkflow_db::repositories::{
    ApprovalFieldKvRepo, ApprovalFormFieldRepo, ApprovalInstanceRepo, ApprovalRawRepo,
    ApprovalTaskRepo,
};
use larkflow_db::DbPool;
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

/// Opens storage sessions.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    type Session: ApprovalSink;

    async fn session(&self) -> Result<Self::Session, sqlx::Error>;
}

/// The five write operations of one ingestion run.
///
/// Counts are rows written. Empty slices are accepted and write nothing.
#[async_trait]
pub trait ApprovalSink: Send {
    async fn store_raw(&mut self, instance_code: &str, raw: &Value) -> Result<(), sqlx::Error>;

    /// Upsert the header row and return its id.
    async fn upsert_instance(&mut self, header: &InstanceHeader) -> Result<DbId, sqlx::Error>;

    async fn upsert_tasks(
        &mut self,
        instance_code: &str,
        tasks: &[TaskRecord],
    ) -> Result<u64, sqlx::Error>;

    async fn upsert_fields(
        &mut self,
        instance_code: &str,
        fields: &[FlattenedField],
    ) -> Result<u64, sqlx::Error>;

    /// Append KV rows. Existing rows are never touched.
    async fn insert_kv_rows(&mut self, rows: &[KvRow]) -> Result<u64, sqlx::Error>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgApprovalStore {
    pool: DbPool,
}

impl PgApprovalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalStore for PgApprovalStore {
    type Session = PgApprovalSession;

    async fn session(&self) -> Result<PgApprovalSession, sqlx::Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgApprovalSession { conn })
    }
}

/// One pooled connection, held for the duration of a processing run.
pub struct PgApprovalSession {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl ApprovalSink for PgApprovalSession {
    async fn store_raw(&mut self, instance_code: &str, raw: &Value) -> Result<(), sqlx::Error> {
        ApprovalRawRepo::upsert(&mut self.conn, instance_code, raw).await?;
        Ok(())
    }

    async fn upsert_instance(&mut self, header: &InstanceHeader) -> Result<DbId, sqlx::Error> {
        let row = ApprovalInstanceRepo::upsert(&mut self.conn, header).await?;
        Ok(row.id)
    }

    async fn upsert_tasks(
        &mut self,
        instance_code: &str,
        tasks: &[TaskRecord],
    ) -> Result<u64, sqlx::Error> {
        ApprovalTaskRepo::upsert_many(&mut self.conn, instance_code, tasks).await
    }

    async fn upsert_fields(
        &mut self,
        instance_code: &str,
        fields: &[FlattenedField],
    ) -> Result<u64, sqlx::Error> {
        ApprovalFormFieldRepo::upsert_many(&mut self.conn, instance_code, fields).await
    }

    async fn insert_kv_rows(&mut self, rows: &[KvRow]) -> Result<u64, sqlx::Error> {
        ApprovalFieldKvRepo::insert_many(&mut self.conn, rows).await
    }
}
