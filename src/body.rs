//! Request body representation, merge rules and wire serialization.

use crate::query::QueryValue;
use crate::{Error, Result};
use serde_json::{Map, Value};

/// The body of a request.
///
/// A body is either a JSON object, a JSON array, or pre-serialized text that
/// is sent exactly as given.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyParameters {
    /// An ordered mapping of fields.
    Object(Map<String, Value>),
    /// A sequence of values.
    Array(Vec<Value>),
    /// A pre-serialized body. Never re-encoded.
    Text(String),
}

impl BodyParameters {
    /// Converts a JSON value into a body.
    ///
    /// Returns `None` for empty or falsy input: `null`, `false`, zero, an empty
    /// string, an empty object or an empty array. Other scalars become their
    /// JSON text.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Array(items) if items.is_empty() => None,
            Value::String(text) if text.is_empty() => None,
            Value::Object(map) => Some(Self::Object(map)),
            Value::Array(items) => Some(Self::Array(items)),
            Value::String(text) => Some(Self::Text(text)),
            scalar => Some(Self::Text(scalar.to_string())),
        }
    }

    /// Merges `incoming` into `current`.
    ///
    /// - empty input clears the body
    /// - objects merge key by key, later keys overwrite earlier ones
    /// - arrays concatenate
    /// - anything else (text on either side, or mismatched kinds) replaces the
    ///   current body wholesale
    pub fn merge(current: Option<Self>, incoming: Value) -> Option<Self> {
        let incoming = Self::from_value(incoming)?;

        match (current, incoming) {
            (Some(Self::Object(mut fields)), Self::Object(new_fields)) => {
                for (key, value) in new_fields {
                    fields.insert(key, value);
                }
                Some(Self::Object(fields))
            }
            (Some(Self::Array(mut items)), Self::Array(new_items)) => {
                items.extend(new_items);
                Some(Self::Array(items))
            }
            (_, incoming) => Some(incoming),
        }
    }

    /// Serializes the body as JSON. Text bodies are returned verbatim.
    pub fn to_json(&self) -> Result<String> {
        let serialized = match self {
            Self::Object(fields) => serde_json::to_string(fields),
            Self::Array(items) => serde_json::to_string(items),
            Self::Text(text) => return Ok(text.clone()),
        };
        serialized.map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serializes the body as `application/x-www-form-urlencoded`.
    ///
    /// Object fields become pairs, skipping `null` values. An array body must
    /// be a list of `[key, value]` pairs. Text bodies are returned verbatim.
    pub fn to_form(&self) -> Result<String> {
        let mut form = url::form_urlencoded::Serializer::new(String::new());

        match self {
            Self::Text(text) => return Ok(text.clone()),
            Self::Object(fields) => {
                for (key, value) in fields {
                    if let Some(value) = value.into_query_value() {
                        form.append_pair(key, &value);
                    }
                }
            }
            Self::Array(items) => {
                for item in items {
                    let (key, value) = form_pair(item)?;
                    if let Some(value) = value.into_query_value() {
                        form.append_pair(key, &value);
                    }
                }
            }
        }

        Ok(form.finish())
    }

    /// Serializes the body for the wire, as a form when `form` is set and as
    /// JSON otherwise.
    pub(crate) fn serialize(&self, form: bool) -> Result<String> {
        if form {
            self.to_form()
        } else {
            self.to_json()
        }
    }
}

fn form_pair(item: &Value) -> Result<(&str, &Value)> {
    match item.as_array().map(Vec::as_slice) {
        Some([Value::String(key), value]) => Ok((key.as_str(), value)),
        _ => Err(Error::Serialization(format!(
            "form bodies given as arrays must contain [key, value] pairs, got {}",
            item
        ))),
    }
}
