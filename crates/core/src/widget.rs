//! Form widget model.
//!
//! The platform delivers a form as a JSON array of `{id, name, type, value}`
//! objects. The shape of `value` depends on `type`. [`Widget::from_object`]
//! is the one place that inspects that shape; downstream code matches on
//! [`WidgetKind`] and [`FieldValue`] instead of poking at raw JSON.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::value::FieldValue;

pub const TYPE_CONTACT: &str = "contact";
pub const TYPE_DEPARTMENT: &str = "department";
pub const TYPE_FIELD_LIST: &str = "fieldList";
pub const TYPE_FORMULA: &str = "formula";

/// Widget types whose value is stored as-is.
pub const SCALAR_TYPES: &[&str] = &[
    "input",
    "textarea",
    "text",
    "number",
    "amount",
    "date",
    "dateInterval",
    "serialNumber",
    "radio",
    "radioV2",
    "checkbox",
    "checkboxV2",
    "telephone",
    "address",
    "image",
    "imageV2",
    "attachment",
    "attachmentV2",
];

/// Scalar types holding a number or a monetary amount.
pub const NUMERIC_TYPES: &[&str] = &["number", "amount"];

/// Scalar types holding a list of image references.
pub const IMAGE_TYPES: &[&str] = &["image", "imageV2"];

/// One node of the form tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: String,
    pub name: String,
    /// Declared platform type, e.g. `input` or `fieldList`.
    pub widget_type: String,
    /// The untouched `value`, kept for flattening and audit snapshots.
    pub raw_value: Value,
    /// `raw_value` classified for typed extraction.
    pub value: FieldValue,
    pub kind: WidgetKind,
}

/// Structural variant of a widget, decided by its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Scalar,
    /// People picker. `user_ids` comes from `value`, `open_ids` from the
    /// parallel `open_ids` list.
    Contact {
        user_ids: Vec<String>,
        open_ids: Vec<String>,
    },
    Department(Vec<DepartmentRef>),
    /// Line-item table (`fieldList`).
    Table(Vec<TableRow>),
    Formula,
    /// Any type not listed above. Carried through untouched.
    Unknown,
}

/// A department reference from a department picker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepartmentRef {
    pub name: Option<String>,
    pub open_id: Option<String>,
}

/// One row of a line-item table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Platform row id when present, otherwise `<table id>#<row index>`.
    pub row_id: String,
    pub cells: Vec<Widget>,
}

impl Widget {
    /// Build a widget from one element of the form array.
    ///
    /// Missing or mistyped attributes degrade to empty strings / `null`; an
    /// unrecognized `type` yields [`WidgetKind::Unknown`].
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let id = text_attr(obj, "id");
        let name = text_attr(obj, "name");
        let widget_type = text_attr(obj, "type");
        let raw_value = obj.get("value").cloned().unwrap_or(Value::Null);

        let kind = match widget_type.as_str() {
            TYPE_CONTACT => WidgetKind::Contact {
                user_ids: contact_ids(&raw_value),
                open_ids: string_list(obj.get("open_ids")),
            },
            TYPE_DEPARTMENT => WidgetKind::Department(department_refs(&raw_value)),
            TYPE_FIELD_LIST => WidgetKind::Table(table_rows(&id, &raw_value)),
            TYPE_FORMULA => WidgetKind::Formula,
            t if SCALAR_TYPES.contains(&t) => WidgetKind::Scalar,
            _ => WidgetKind::Unknown,
        };

        Self {
            id,
            name,
            widget_type,
            value: FieldValue::from_json(&raw_value),
            raw_value,
            kind,
        }
    }

    /// Build widgets from a JSON array, skipping elements that are not objects.
    pub fn list_from_json(items: &[Value]) -> Vec<Self> {
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(Self::from_object(obj)),
                other => {
                    tracing::warn!(element = %other, "Skipping non-object form element");
                    None
                }
            })
            .collect()
    }

    pub fn is_numeric(&self) -> bool {
        NUMERIC_TYPES.contains(&self.widget_type.as_str())
    }

    pub fn is_image(&self) -> bool {
        IMAGE_TYPES.contains(&self.widget_type.as_str())
    }
}

/// Read an attribute as text. Numbers are stringified; anything else is empty.
fn text_attr(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

/// Contact values are either plain id strings or `{id | user_id}` objects.
fn contact_ids(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("id")
                .or_else(|| obj.get("user_id"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        })
        .collect()
}

fn department_refs(value: &Value) -> Vec<DepartmentRef> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(DepartmentRef {
                name: obj.get("name").and_then(Value::as_str).map(str::to_owned),
                open_id: obj
                    .get("open_id")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            }),
            Value::String(s) => Some(DepartmentRef {
                name: None,
                open_id: Some(s.clone()),
            }),
            _ => None,
        })
        .collect()
}

/// Rows are arrays of cell objects, or `{id, value: [cells]}` objects when
/// the platform assigns row ids.
fn table_rows(table_id: &str, value: &Value) -> Vec<TableRow> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let fallback_id = format!("{table_id}#{index}");
            match row {
                Value::Array(cells) => TableRow {
                    row_id: fallback_id,
                    cells: Widget::list_from_json(cells),
                },
                Value::Object(obj) => TableRow {
                    row_id: obj
                        .get("id")
                        .or_else(|| obj.get("row_id"))
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                        .unwrap_or(fallback_id),
                    cells: obj
                        .get("value")
                        .and_then(Value::as_array)
                        .map(|cells| Widget::list_from_json(cells))
                        .unwrap_or_default(),
                },
                _ => TableRow {
                    row_id: fallback_id,
                    cells: Vec::new(),
                },
            }
        })
        .collect()
}
