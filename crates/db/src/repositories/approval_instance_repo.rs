//! Repository for the `approval_instances` table.

use larkflow_core::instance::InstanceHeader;
use sqlx::{PgConnection, PgPool};

use crate::models::approval::ApprovalInstanceRow;

/// Column list for `approval_instances` queries.
const COLUMNS: &str = "id, instance_code, approval_code, approval_name, status, \
    applicant_user_id, department_id, start_time, end_time, create_time, update_time, \
    created_at, updated_at";

/// Provides upsert and lookup for instance headers.
pub struct ApprovalInstanceRepo;

impl ApprovalInstanceRepo {
    /// Insert a header, or update the mutable columns of an existing one.
    ///
    /// Uses `ON CONFLICT (instance_code) DO UPDATE`; only status, end time,
    /// update time and the display name move after the first insert.
    pub async fn upsert(
        conn: &mut PgConnection,
        header: &InstanceHeader,
    ) -> Result<ApprovalInstanceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_instances \
                (instance_code, approval_code, approval_name, status, applicant_user_id, \
                 department_id, start_time, end_time, create_time, update_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (instance_code) DO UPDATE \
             SET status = EXCLUDED.status, \
                 end_time = EXCLUDED.end_time, \
                 update_time = EXCLUDED.update_time, \
                 approval_name = COALESCE(EXCLUDED.approval_name, approval_instances.approval_name) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalInstanceRow>(&query)
            .bind(&header.instance_code)
            .bind(&header.approval_code)
            .bind(&header.approval_name)
            .bind(&header.status)
            .bind(&header.applicant_user_id)
            .bind(&header.department_id)
            .bind(header.start_time)
            .bind(header.end_time)
            .bind(header.create_time)
            .bind(header.update_time)
            .fetch_one(conn)
            .await
    }

    /// Find an instance header by its code.
    pub async fn find_by_code(
        pool: &PgPool,
        instance_code: &str,
    ) -> Result<Option<ApprovalInstanceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_instances WHERE instance_code = $1");
        sqlx::query_as::<_, ApprovalInstanceRow>(&query)
            .bind(instance_code)
            .fetch_optional(pool)
            .await
    }
}
