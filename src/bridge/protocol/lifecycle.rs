//! MCP lifecycle messages.
//!
//! The handshake is two messages: an `initialize` request whose reply must be
//! awaited, followed by a `notifications/initialized` notification.

pub(crate) const INITIALIZE_METHOD: &str = "initialize";
pub(crate) const INITIALIZED_NOTIFICATION: &str = "notifications/initialized";
pub(crate) const TOOLS_CALL_METHOD: &str = "tools/call";

/// MCP protocol revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Client name announced during `initialize`.
pub const CLIENT_NAME: &str = "brain-bridge";

/// Params for the `initialize` request.
pub(crate) fn initialize_params() -> serde_json::Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": CLIENT_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Params for the `notifications/initialized` notification.
pub(crate) fn initialized_params() -> serde_json::Value {
    serde_json::json!({})
}

/// Params for a `tools/call` request.
pub(crate) fn tool_call_params(name: &str, arguments: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "arguments": arguments
    })
}
