//! Tagged cell values
//!
//! Documents are schema-less, so every field value is mapped onto a closed
//! set of variants. BSON types with no direct counterpart become strings;
//! executable or internal types are rejected.

use std::fmt;

use base64::Engine;
use bson::{Bson, Document};
use serde_json::Value as JsonValue;

use crate::error::{FrameError, Result};

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Nested document, fields in stored order.
    Document(Vec<(String, Value)>),
}

impl Value {
    /// Convert a BSON value found under `field`.
    ///
    /// # Arguments
    /// * `field` - Field name, used for error reporting
    /// * `value` - BSON value to convert
    ///
    /// # Returns
    /// * `Result<Value>` - Converted value or `FrameError::UnsupportedType`
    pub fn from_bson(field: &str, value: &Bson) -> Result<Self> {
        let converted = match value {
            Bson::Null | Bson::Undefined => Value::Null,
            Bson::Boolean(b) => Value::Bool(*b),
            Bson::Int32(n) => Value::Int(i64::from(*n)),
            Bson::Int64(n) => Value::Int(*n),
            Bson::Double(f) => Value::Float(*f),
            Bson::String(s) => Value::String(s.clone()),
            Bson::Symbol(s) => Value::String(s.clone()),
            Bson::ObjectId(oid) => Value::String(oid.to_hex()),
            Bson::DateTime(dt) => Value::String(
                dt.try_to_rfc3339_string()
                    .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
            ),
            Bson::Decimal128(d) => Value::String(d.to_string()),
            Bson::Timestamp(ts) => Value::String(format!("Timestamp({}, {})", ts.time, ts.increment)),
            Bson::Binary(bin) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(&bin.bytes))
            }
            Bson::RegularExpression(regex) => {
                Value::String(format!("/{}/{}", regex.pattern, regex.options))
            }
            Bson::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Value::from_bson(field, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Bson::Document(doc) => Value::Document(Self::fields_of(field, doc)?),
            other => {
                return Err(FrameError::UnsupportedType {
                    field: field.to_string(),
                    type_name: format!("{:?}", other.element_type()),
                }
                .into());
            }
        };

        Ok(converted)
    }

    fn fields_of(parent: &str, doc: &Document) -> Result<Vec<(String, Value)>> {
        doc.iter()
            .map(|(key, value)| {
                let path = format!("{parent}.{key}");
                Ok((key.clone(), Value::from_bson(&path, value)?))
            })
            .collect()
    }

    /// String contents, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a `serde_json` value.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) => JsonValue::Number((*n).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Document(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                if x.fract() == 0.0 && x.abs() < 1e10 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::String(s) => write!(f, "{s}"),
            Value::Array(_) | Value::Document(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
