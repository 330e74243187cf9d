//! Widget value classification.
//!
//! A widget's `value` arrives as arbitrary JSON. [`FieldValue::from_json`]
//! resolves it once into a closed set of shapes, and
//! [`FieldValue::extract`] turns that shape into the typed
//! (text, numeric, currency) triple stored in the KV table.
//!
//! Classification priority:
//!
//! 1. `null` / missing -> nothing.
//! 2. Object with an `amount` key -> monetary value.
//! 3. Object without `amount` -> canonical JSON text.
//! 4. Number -> text + numeric.
//! 5. String -> text.
//! 6. Anything else (arrays, booleans) -> canonical JSON text.

use serde::Serialize;
use serde_json::{Number, Value};

/// Key that marks an object value as monetary.
pub const AMOUNT_KEY: &str = "amount";

/// Currency code carried next to [`AMOUNT_KEY`].
pub const CURRENCY_KEY: &str = "currency";

/// A widget value resolved at the parse boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The widget had no value (`null` or the key was missing).
    Absent,
    /// A monetary object such as `{"amount": "12.50", "currency": "CNY"}`.
    Amount {
        amount: Value,
        currency: Option<String>,
    },
    Number(Number),
    Text(String),
    /// Any other composite: objects without an amount, arrays, booleans.
    Structured(Value),
}

/// The typed representation of one widget value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedValue {
    pub text: Option<String>,
    pub number: Option<f64>,
    pub currency: Option<String>,
}

impl FieldValue {
    /// Classify a raw JSON value. Never fails.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Absent,
            Value::Object(map) => match map.get(AMOUNT_KEY) {
                Some(amount) => FieldValue::Amount {
                    amount: amount.clone(),
                    currency: map
                        .get(CURRENCY_KEY)
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                },
                None => FieldValue::Structured(value.clone()),
            },
            Value::Number(n) => FieldValue::Number(n.clone()),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(_) | Value::Bool(_) => FieldValue::Structured(value.clone()),
        }
    }

    /// Produce the (text, numeric, currency) triple.
    pub fn extract(&self) -> ExtractedValue {
        match self {
            FieldValue::Absent => ExtractedValue::default(),
            FieldValue::Amount { amount, currency } => {
                let (text, number) = match amount {
                    Value::Null => (None, None),
                    Value::Number(n) => (Some(n.to_string()), n.as_f64()),
                    Value::String(s) => (Some(s.clone()), parse_number(s)),
                    other => (Some(canonical_json(other)), None),
                };
                ExtractedValue {
                    text,
                    number,
                    currency: currency.clone(),
                }
            }
            FieldValue::Number(n) => ExtractedValue {
                text: Some(n.to_string()),
                number: n.as_f64(),
                currency: None,
            },
            FieldValue::Text(s) => ExtractedValue {
                text: Some(s.clone()),
                ..ExtractedValue::default()
            },
            FieldValue::Structured(v) => ExtractedValue {
                text: Some(canonical_json(v)),
                ..ExtractedValue::default()
            },
        }
    }

    /// Best-effort numeric reading: numbers, numeric strings and amounts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(s) => parse_number(s),
            FieldValue::Amount { amount, .. } => match amount {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => parse_number(s),
                _ => None,
            },
            FieldValue::Absent | FieldValue::Structured(_) => None,
        }
    }
}

/// Stable JSON text for storage and audit.
///
/// `serde_json` keeps object keys sorted (no `preserve_order`), so the same
/// value always serializes to the same string. Non-ASCII text is written as-is.
pub fn canonical_json(value: &Value) -> String {
    value.to_string()
}

/// Parse a decimal string into a finite `f64`.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
