//! Repository for the `approval_form_fields` table.

use larkflow_core::flatten::FlattenedField;
use sqlx::{Connection, PgConnection, PgPool};

use crate::models::approval::ApprovalFormField;

/// Column list for `approval_form_fields` queries.
const COLUMNS: &str =
    "id, instance_code, field_id, field_name, field_type, field_value, created_at, updated_at";

/// Provides bulk upsert and listing for flattened form fields.
pub struct ApprovalFormFieldRepo;

impl ApprovalFormFieldRepo {
    /// Upsert the flattened fields of an instance within one transaction.
    ///
    /// Keyed by `(instance_code, field_id)`. An empty slice is a no-op.
    pub async fn upsert_many(
        conn: &mut PgConnection,
        instance_code: &str,
        fields: &[FlattenedField],
    ) -> Result<u64, sqlx::Error> {
        if fields.is_empty() {
            return Ok(0);
        }

        let mut tx = conn.begin().await?;
        let mut written = 0;

        for field in fields {
            let result = sqlx::query(
                "INSERT INTO approval_form_fields \
                    (instance_code, field_id, field_name, field_type, field_value) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (instance_code, field_id) DO UPDATE \
                 SET field_name = EXCLUDED.field_name, \
                     field_type = EXCLUDED.field_type, \
                     field_value = EXCLUDED.field_value",
            )
            .bind(instance_code)
            .bind(&field.field_id)
            .bind(&field.field_name)
            .bind(&field.field_type)
            .bind(&field.field_value)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(instance_code, written, "Upserted approval form fields");
        Ok(written)
    }

    /// List the fields of an instance in insertion order.
    pub async fn list_for_instance(
        pool: &PgPool,
        instance_code: &str,
    ) -> Result<Vec<ApprovalFormField>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_form_fields \
             WHERE instance_code = $1 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ApprovalFormField>(&query)
            .bind(instance_code)
            .fetch_all(pool)
            .await
    }
}
