//! Callback processing.

use std::sync::Arc;

use larkflow_core::callback::CallbackEvent;
use larkflow_core::flatten::flatten_fields;
use larkflow_core::form::{parse_document, NormalizedDocument};
use larkflow_core::instance::{ApprovalInstance, InstanceHeader, InstanceStatus, TaskRecord};
use larkflow_core::kv::build_kv_rows;
use larkflow_core::types::DbId;
use serde::Serialize;

use crate::error::PipelineError;
use crate::fetch::InstanceFetcher;
use crate::store::{ApprovalSink, ApprovalStore};

/// Outcome of one processing run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub instance_code: String,
    /// Database id of the header row.
    pub instance_id: DbId,
    pub status: Option<String>,
    /// Whether the status is final (approved, rejected, canceled or deleted).
    pub terminal: bool,
    pub tasks_written: u64,
    pub fields_written: u64,
    pub kv_rows_written: u64,
    pub document: NormalizedDocument,
}

/// Runs the fetch-and-persist sequence for approval callbacks.
pub struct ApprovalService<S> {
    fetcher: Arc<dyn InstanceFetcher>,
    store: S,
}

impl<S: ApprovalStore> ApprovalService<S> {
    pub fn new(fetcher: Arc<dyn InstanceFetcher>, store: S) -> Self {
        Self { fetcher, store }
    }

    /// Process one callback.
    ///
    /// A callback without `instance_code` fails before any remote or storage
    /// call. After a successful fetch, one storage session is opened and the
    /// raw snapshot, header, tasks, fields and KV rows are written in that
    /// order, each committing independently. The first storage failure aborts
    /// the remaining steps.
    pub async fn process(&self, event: &CallbackEvent) -> Result<ProcessReport, PipelineError> {
        let requested_code = event.require_instance_code()?.to_string();

        tracing::info!(
            instance_code = %requested_code,
            status = ?event.status,
            event_type = ?event.event_type,
            "Processing approval callback",
        );

        let raw = self
            .fetcher
            .fetch_instance(&requested_code)
            .await
            .map_err(|source| PipelineError::Fetch {
                instance_code: requested_code.clone(),
                source,
            })?;

        let instance = ApprovalInstance::from_json(&raw)?;
        let header = InstanceHeader::project(&requested_code, &instance);
        let code = header.instance_code.clone();

        let tasks: Vec<TaskRecord> = instance
            .task_list
            .iter()
            .filter_map(|node| {
                let record = TaskRecord::from_node(node);
                if record.is_none() {
                    tracing::warn!(
                        instance_code = %code,
                        node_name = ?node.node_name,
                        "Skipping task without id or node_id",
                    );
                }
                record
            })
            .collect();
        let widgets = instance.widgets();

        let mut sink = self.store.session().await?;

        sink.store_raw(&code, &raw).await?;
        tracing::debug!(instance_code = %code, "Stored raw instance");

        let instance_id = sink.upsert_instance(&header).await?;
        tracing::debug!(instance_code = %code, instance_id, "Upserted instance header");

        let mut tasks_written = 0;
        if !tasks.is_empty() {
            tasks_written = sink.upsert_tasks(&code, &tasks).await?;
            tracing::debug!(instance_code = %code, tasks_written, "Upserted tasks");
        }

        let mut fields_written = 0;
        let mut kv_rows_written = 0;
        if widgets.is_empty() {
            tracing::debug!(instance_code = %code, "Instance has no form widgets");
        } else {
            let fields = flatten_fields(&widgets);
            fields_written = sink.upsert_fields(&code, &fields).await?;
            tracing::debug!(instance_code = %code, fields_written, "Upserted form fields");

            let kv_rows = build_kv_rows(&code, &widgets);
            kv_rows_written = sink.insert_kv_rows(&kv_rows).await?;
            tracing::debug!(instance_code = %code, kv_rows_written, "Appended KV rows");
        }

        let document = parse_document(&widgets);
        let terminal = header
            .status
            .as_deref()
            .map(InstanceStatus::parse)
            .is_some_and(|status| status.is_terminal());

        tracing::info!(
            instance_code = %code,
            instance_id,
            status = ?header.status,
            terminal,
            tasks_written,
            fields_written,
            kv_rows_written,
            "Approval instance processed",
        );

        Ok(ProcessReport {
            instance_code: code,
            instance_id,
            status: header.status,
            terminal,
            tasks_written,
            fields_written,
            kv_rows_written,
            document,
        })
    }

    /// Process an instance by code alone, as if a bare callback arrived.
    pub async fn process_instance_code(
        &self,
        instance_code: &str,
    ) -> Result<ProcessReport, PipelineError> {
        self.process(&CallbackEvent::for_instance(instance_code)).await
    }
}
