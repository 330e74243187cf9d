//! Flat field list for generic storage.
//!
//! One record per top-level widget, value serialized as canonical JSON text.
//! Independent of name normalization: ids, names and types are stored exactly
//! as the platform sent them.

use serde::Serialize;

use crate::value::canonical_json;
use crate::widget::Widget;

/// A row of the `approval_form_fields` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedField {
    pub field_id: String,
    pub field_name: String,
    pub field_type: String,
    /// Canonical JSON of the raw value. Line-item widgets serialize all rows.
    pub field_value: String,
}

/// Flatten top-level widgets, preserving input order.
pub fn flatten_fields(widgets: &[Widget]) -> Vec<FlattenedField> {
    widgets
        .iter()
        .map(|w| FlattenedField {
            field_id: w.id.clone(),
            field_name: w.name.clone(),
            field_type: w.widget_type.clone(),
            field_value: canonical_json(&w.raw_value),
        })
        .collect()
}
