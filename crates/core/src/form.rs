//! Form decoding and normalization.
//!
//! [`decode_form`] turns the instance's `form` attribute (a JSON-encoded
//! string or an already-decoded array) into [`Widget`]s. [`parse_document`]
//! walks those widgets and builds a [`NormalizedDocument`] keyed by canonical
//! business names.
//!
//! Neither function fails: undecodable input yields an empty form, and
//! unrecognized widgets pass through under their raw name.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::naming::{FORM_FIELDS, LINE_ITEMS};
use crate::value::FieldValue;
use crate::widget::{DepartmentRef, TableRow, Widget, WidgetKind};

/// Reserved document key for the contact-picker applicant.
pub const KEY_APPLICANT: &str = "applicant";
/// Reserved document key for the department picker.
pub const KEY_DEPARTMENT: &str = "department";
/// Reserved document key for line-item rows.
pub const KEY_LINE_ITEMS: &str = "line_items";
/// Reserved document key for the formula total.
pub const KEY_TOTAL: &str = "total";

/// One line-item row keyed by canonical cell name.
pub type LineItem = BTreeMap<String, Value>;

/// The normalized business view of a form.
///
/// Serializes as a single flat object: `fields`, plus `line_items` when any
/// rows exist, plus `total` when a formula widget was present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDocument {
    pub fields: BTreeMap<String, Value>,
    pub line_items: Vec<LineItem>,
    pub total: Option<Value>,
}

impl NormalizedDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn to_value(&self) -> Value {
        let mut map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !self.line_items.is_empty() {
            let rows = self.line_items.iter().map(line_item_value).collect();
            map.insert(KEY_LINE_ITEMS.to_string(), Value::Array(rows));
        }
        if let Some(total) = &self.total {
            map.insert(KEY_TOTAL.to_string(), total.clone());
        }
        Value::Object(map)
    }
}

impl Serialize for NormalizedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Decode the `form` attribute of an approval instance.
pub fn decode_form(form: Option<&Value>) -> Vec<Widget> {
    match form {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(encoded)) if encoded.trim().is_empty() => Vec::new(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => Widget::list_from_json(&items),
            Ok(other) => {
                tracing::warn!(kind = json_kind(&other), "Decoded form is not an array");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Form string is not valid JSON");
                Vec::new()
            }
        },
        Some(Value::Array(items)) => Widget::list_from_json(items),
        Some(other) => {
            tracing::warn!(kind = json_kind(other), "Unsupported form representation");
            Vec::new()
        }
    }
}

/// Build the normalized document for a widget list.
pub fn parse_document(widgets: &[Widget]) -> NormalizedDocument {
    let mut doc = NormalizedDocument::default();

    for widget in widgets {
        match &widget.kind {
            WidgetKind::Scalar => {
                doc.fields
                    .insert(FORM_FIELDS.normalize(&widget.name), widget.raw_value.clone());
            }
            WidgetKind::Contact { user_ids, open_ids } => {
                doc.fields
                    .insert(KEY_APPLICANT.to_string(), contact_value(user_ids, open_ids));
            }
            WidgetKind::Department(refs) => {
                doc.fields
                    .insert(KEY_DEPARTMENT.to_string(), department_value(refs));
            }
            WidgetKind::Table(rows) => {
                doc.line_items.extend(rows.iter().map(line_item));
            }
            WidgetKind::Formula => {
                doc.total = Some(widget.raw_value.clone());
            }
            WidgetKind::Unknown => {
                doc.fields
                    .insert(widget.name.clone(), widget.raw_value.clone());
            }
        }
    }

    doc
}

fn contact_value(user_ids: &[String], open_ids: &[String]) -> Value {
    let first = |ids: &[String]| ids.first().map_or(Value::Null, |id| Value::String(id.clone()));
    serde_json::json!({
        "user_id": first(user_ids),
        "open_id": first(open_ids),
    })
}

fn department_value(refs: &[DepartmentRef]) -> Value {
    match refs.first() {
        Some(dept) => serde_json::json!({
            "name": dept.name,
            "open_id": dept.open_id,
        }),
        None => Value::Object(Map::new()),
    }
}

fn line_item(row: &TableRow) -> LineItem {
    row.cells
        .iter()
        .map(|cell| {
            let key = match cell.kind {
                WidgetKind::Unknown => cell.name.clone(),
                _ => LINE_ITEMS.normalize(&cell.name),
            };
            (key, cell_value(cell))
        })
        .collect()
}

fn line_item_value(item: &LineItem) -> Value {
    Value::Object(item.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Value of one cell inside a line-item row.
fn cell_value(cell: &Widget) -> Value {
    match &cell.kind {
        WidgetKind::Scalar if cell.is_numeric() => coerce_integer(&cell.value, &cell.raw_value),
        WidgetKind::Scalar if cell.is_image() && cell.value == FieldValue::Absent => {
            Value::Array(Vec::new())
        }
        WidgetKind::Scalar | WidgetKind::Formula | WidgetKind::Unknown => cell.raw_value.clone(),
        WidgetKind::Contact { user_ids, open_ids } => contact_value(user_ids, open_ids),
        WidgetKind::Department(refs) => department_value(refs),
        WidgetKind::Table(rows) => {
            Value::Array(rows.iter().map(|r| line_item_value(&line_item(r))).collect())
        }
    }
}

/// Collapse a numeric or monetary cell to an integer.
///
/// Values with a fractional part stay floats; unreadable values are kept raw.
fn coerce_integer(value: &FieldValue, raw: &Value) -> Value {
    match value {
        FieldValue::Absent => Value::Null,
        _ => match value.as_f64() {
            Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Value::Number(Number::from(n as i64))
            }
            Some(n) => Number::from_f64(n).map_or_else(|| raw.clone(), Value::Number),
            None => raw.clone(),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
