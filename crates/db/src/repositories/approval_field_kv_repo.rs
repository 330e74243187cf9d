//! Repository for the append-only `approval_field_kv` table.

use larkflow_core::kv::KvRow;
use sqlx::{Connection, PgConnection, PgPool};

use crate::models::approval::ApprovalFieldKv;

/// Column list for `approval_field_kv` queries.
const COLUMNS: &str = "id, approval_id, row_id, widget_id, field_name, field_type, \
    field_value_text, field_value_num, currency, extra_json, created_at, updated_at";

/// Provides inserts and listing for typed KV rows.
pub struct ApprovalFieldKvRepo;

impl ApprovalFieldKvRepo {
    /// Append KV rows within one transaction. Never updates existing rows.
    ///
    /// Returns the number of rows inserted; an empty slice is a no-op.
    pub async fn insert_many(conn: &mut PgConnection, rows: &[KvRow]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = conn.begin().await?;
        let mut written = 0;

        for row in rows {
            let result = sqlx::query(
                "INSERT INTO approval_field_kv \
                    (approval_id, row_id, widget_id, field_name, field_type, \
                     field_value_text, field_value_num, currency, extra_json) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(&row.approval_id)
            .bind(&row.row_id)
            .bind(&row.widget_id)
            .bind(&row.field_name)
            .bind(&row.field_type)
            .bind(&row.field_value_text)
            .bind(row.field_value_num)
            .bind(&row.currency)
            .bind(&row.extra_json)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(rows = rows.len(), written, "Appended approval field KV rows");
        Ok(written)
    }

    /// List every KV row recorded for an instance, oldest first.
    pub async fn list_for_instance(
        pool: &PgPool,
        instance_code: &str,
    ) -> Result<Vec<ApprovalFieldKv>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_field_kv \
             WHERE approval_id = $1 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ApprovalFieldKv>(&query)
            .bind(instance_code)
            .fetch_all(pool)
            .await
    }

    /// Count KV rows recorded for an instance.
    pub async fn count_for_instance(pool: &PgPool, instance_code: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM approval_field_kv WHERE approval_id = $1")
            .bind(instance_code)
            .fetch_one(pool)
            .await
    }
}
