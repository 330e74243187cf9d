//! Repository for the `approval_tasks` table.

use larkflow_core::instance::TaskRecord;
use sqlx::{Connection, PgConnection, PgPool};

use crate::models::approval::ApprovalTask;

/// Column list for `approval_tasks` queries.
const COLUMNS: &str = "id, instance_code, task_id, node_id, node_name, node_type, status, \
    user_id, open_id, start_time, end_time, created_at, updated_at";

/// Provides bulk upsert and listing for workflow tasks.
pub struct ApprovalTaskRepo;

impl ApprovalTaskRepo {
    /// Upsert every task of an instance within one transaction.
    ///
    /// Keyed by `(instance_code, task_id)`. Returns the number of rows written;
    /// an empty slice is a no-op.
    pub async fn upsert_many(
        conn: &mut PgConnection,
        instance_code: &str,
        tasks: &[TaskRecord],
    ) -> Result<u64, sqlx::Error> {
        if tasks.is_empty() {
            return Ok(0);
        }

        let mut tx = conn.begin().await?;
        let mut written = 0;

        for task in tasks {
            let result = sqlx::query(
                "INSERT INTO approval_tasks \
                    (instance_code, task_id, node_id, node_name, node_type, status, \
                     user_id, open_id, start_time, end_time) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 ON CONFLICT (instance_code, task_id) DO UPDATE \
                 SET node_id = EXCLUDED.node_id, \
                     node_name = EXCLUDED.node_name, \
                     node_type = EXCLUDED.node_type, \
                     status = EXCLUDED.status, \
                     user_id = EXCLUDED.user_id, \
                     open_id = EXCLUDED.open_id, \
                     start_time = EXCLUDED.start_time, \
                     end_time = EXCLUDED.end_time",
            )
            .bind(instance_code)
            .bind(&task.task_id)
            .bind(&task.node_id)
            .bind(&task.node_name)
            .bind(&task.node_type)
            .bind(&task.status)
            .bind(&task.user_id)
            .bind(&task.open_id)
            .bind(task.start_time)
            .bind(task.end_time)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(instance_code, written, "Upserted approval tasks");
        Ok(written)
    }

    /// List the tasks of an instance ordered by start time.
    pub async fn list_for_instance(
        pool: &PgPool,
        instance_code: &str,
    ) -> Result<Vec<ApprovalTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_tasks \
             WHERE instance_code = $1 \
             ORDER BY start_time ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, ApprovalTask>(&query)
            .bind(instance_code)
            .fetch_all(pool)
            .await
    }
}
