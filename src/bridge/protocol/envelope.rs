//! Tool result envelope handling.
//!
//! `tools/call` replies wrap the payload as
//! `{"content": [{"type": "text", "text": "<json-or-plain-string>"}]}`.
//! The remote tools change shape between methods and versions, so the payload
//! stays a loose JSON document with typed accessors instead of fixed records.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key of the placeholder object produced for non-JSON text payloads.
pub const RAW_TEXT_KEY: &str = "raw_text";

/// Schema-loose structured result of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolDocument(Value);

impl ToolDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Unwrap the `result` of a `tools/call` response.
    ///
    /// The first content item is used when it is a text item: its text is parsed
    /// as JSON, falling back to `{"raw_text": <text>}`. Results without that
    /// envelope are returned unchanged.
    pub fn from_call_result(result: Value) -> Self {
        let first_text = result
            .get("content")
            .and_then(Value::as_array)
            .and_then(|content| content.first())
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            .map(|item| item.get("text").and_then(Value::as_str).unwrap_or(""));

        match first_text {
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(parsed) => Self(parsed),
                Err(_) => Self(serde_json::json!({ RAW_TEXT_KEY: text })),
            },
            None => Self(result),
        }
    }

    /// The original text when the payload was not valid JSON.
    pub fn raw_text(&self) -> Option<&str> {
        self.0.get(RAW_TEXT_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        str_field(&self.0, key)
    }

    /// Array under `key`, empty when missing or not an array.
    pub fn array(&self, key: &str) -> &[Value] {
        array_field(&self.0, key)
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ToolDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

pub(crate) fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
