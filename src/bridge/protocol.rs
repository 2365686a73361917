//! Protocol layer for Brain MCP communication.
//!
//! Message builders, request ids, handshake constants and tool-result
//! unwrapping. Nothing in here performs I/O.

mod envelope;
mod lifecycle;
mod message;
mod request_id;

pub use envelope::{RAW_TEXT_KEY, ToolDocument};
pub(crate) use envelope::{array_field, str_field};
pub(crate) use lifecycle::{
    INITIALIZE_METHOD, INITIALIZED_NOTIFICATION, TOOLS_CALL_METHOD, initialize_params,
    initialized_params, tool_call_params,
};
pub use lifecycle::{CLIENT_NAME, PROTOCOL_VERSION};
pub(crate) use message::{build_notification, build_request, encode_line, response_error};
pub(crate) use request_id::{RequestId, RequestIdSequence};
