//! Typed key-value rows.
//!
//! A second, independent pass over the widget list that emits one
//! [`KvRow`] per leaf widget occurrence. Line-item tables emit one row per
//! cell, tagged with the row id so cells of the same item can be grouped on
//! read. Rows are emitted even when every typed value is empty: the row
//! itself records that the field existed on the instance.

use serde::Serialize;

use crate::value::canonical_json;
use crate::widget::{TableRow, Widget, WidgetKind};

/// A row of the append-only `approval_field_kv` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KvRow {
    /// The owning instance code.
    pub approval_id: String,
    /// Line-item row id; `None` for widgets outside a table.
    pub row_id: Option<String>,
    pub widget_id: String,
    pub field_name: String,
    pub field_type: String,
    pub field_value_text: Option<String>,
    pub field_value_num: Option<f64>,
    pub currency: Option<String>,
    /// Canonical JSON snapshot of the raw value.
    pub extra_json: String,
}

/// Build KV rows for every widget of an instance's form.
pub fn build_kv_rows(instance_code: &str, widgets: &[Widget]) -> Vec<KvRow> {
    let mut rows = Vec::new();
    for widget in widgets {
        push_widget(&mut rows, instance_code, widget, None);
    }
    rows
}

fn push_widget(out: &mut Vec<KvRow>, instance_code: &str, widget: &Widget, row_id: Option<&str>) {
    match &widget.kind {
        WidgetKind::Table(table_rows) => {
            let before = out.len();
            for row in table_rows {
                push_table_row(out, instance_code, row);
            }
            // A table without any cells still records its existence.
            if out.len() == before {
                out.push(kv_row(instance_code, widget, row_id));
            }
        }
        _ => out.push(kv_row(instance_code, widget, row_id)),
    }
}

fn push_table_row(out: &mut Vec<KvRow>, instance_code: &str, row: &TableRow) {
    for cell in &row.cells {
        push_widget(out, instance_code, cell, Some(&row.row_id));
    }
}

fn kv_row(instance_code: &str, widget: &Widget, row_id: Option<&str>) -> KvRow {
    let extracted = widget.value.extract();
    KvRow {
        approval_id: instance_code.to_string(),
        row_id: row_id.map(str::to_owned),
        widget_id: widget.id.clone(),
        field_name: widget.name.clone(),
        field_type: widget.widget_type.clone(),
        field_value_text: extracted.text,
        field_value_num: extracted.number,
        currency: extracted.currency,
        extra_json: canonical_json(&widget.raw_value),
    }
}
