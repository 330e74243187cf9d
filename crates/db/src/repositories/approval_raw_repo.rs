//! Repository for the `approval_raw` table.

use sqlx::{PgConnection, PgPool};

use crate::models::approval::RawApproval;

/// Column list for `approval_raw` queries.
const COLUMNS: &str = "id, instance_code, raw_json, created_at, updated_at";

/// Stores the verbatim instance document returned by the platform.
pub struct ApprovalRawRepo;

impl ApprovalRawRepo {
    /// Insert or replace the raw document for an instance.
    pub async fn upsert(
        conn: &mut PgConnection,
        instance_code: &str,
        raw_json: &serde_json::Value,
    ) -> Result<RawApproval, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_raw (instance_code, raw_json) \
             VALUES ($1, $2) \
             ON CONFLICT (instance_code) DO UPDATE \
             SET raw_json = EXCLUDED.raw_json \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RawApproval>(&query)
            .bind(instance_code)
            .bind(raw_json)
            .fetch_one(conn)
            .await
    }

    /// Find the raw document for an instance.
    pub async fn find_by_code(
        pool: &PgPool,
        instance_code: &str,
    ) -> Result<Option<RawApproval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_raw WHERE instance_code = $1");
        sqlx::query_as::<_, RawApproval>(&query)
            .bind(instance_code)
            .fetch_optional(pool)
            .await
    }
}
