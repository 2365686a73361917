//! Line-framed JSON-RPC 2.0 message builders.

use serde_json::Value;

use super::request_id::RequestId;
use crate::error::BridgeResult;

/// Build a JSON-RPC request.
pub(crate) fn build_request(id: RequestId, method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id.as_i64(),
        "method": method,
        "params": params
    })
}

/// Build a JSON-RPC notification (no id, no reply expected).
pub(crate) fn build_notification(method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    })
}

/// Serialize a message as exactly one `\n`-terminated line.
///
/// serde_json escapes control characters inside strings, so the compact form
/// never contains a raw newline.
pub(crate) fn encode_line(message: &Value) -> BridgeResult<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Return the response's error object when it carries a meaningful one.
///
/// `null`, `false`, empty objects, empty arrays and empty strings count as
/// "no error".
pub(crate) fn response_error(response: &Value) -> Option<&Value> {
    response.get("error").filter(|error| match error {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Object(map) => !map.is_empty(),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) => true,
    })
}
