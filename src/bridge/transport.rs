//! Line-delimited JSON-RPC transport.
//!
//! One JSON object per `\n`-terminated line in both directions. The transport is
//! strictly synchronous: a request is written and flushed, then lines are read
//! until the reply carrying the same id shows up. Lines that are not JSON, and
//! JSON messages with any other id, are discarded. End of stream before the
//! reply means the server is gone.
//!
//! The transport is generic over its streams so that it runs unchanged against
//! a child process's pipes or in-memory buffers.

use serde_json::Value;
use std::io::{BufRead, Read, Write};

use super::protocol::{
    RequestId, RequestIdSequence, TOOLS_CALL_METHOD, ToolDocument, build_notification,
    build_request, encode_line, response_error, tool_call_params,
};
use crate::error::{BridgeError, BridgeResult};

/// Upper bound on stderr bytes attached to a `ProcessExited` error.
const MAX_DIAGNOSTIC_BYTES: u64 = 64 * 1024;

/// Blocking JSON-RPC transport over a writer/reader pair.
///
/// Owns the request-id sequence and the read position of the output stream;
/// callers must not share one transport between concurrent requests.
pub struct LineTransport<W, R> {
    writer: W,
    reader: R,
    /// Error stream read after a fatal EOF to explain why the server died
    diagnostics: Option<Box<dyn Read + Send>>,
    ids: RequestIdSequence,
}

impl<W, R> std::fmt::Debug for LineTransport<W, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineTransport")
            .field("ids", &self.ids)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl<W: Write, R: BufRead> LineTransport<W, R> {
    pub fn new(writer: W, reader: R) -> Self {
        Self {
            writer,
            reader,
            diagnostics: None,
            ids: RequestIdSequence::new(),
        }
    }

    /// Attach the server's error stream for post-mortem diagnostics.
    pub fn with_diagnostics(mut self, stream: impl Read + Send + 'static) -> Self {
        self.diagnostics = Some(Box::new(stream));
        self
    }

    /// Send a request and block until its reply arrives.
    ///
    /// Returns the reply's `result` (JSON `null` when absent).
    ///
    /// # Errors
    /// - `Io` if writing or reading fails
    /// - `ProcessExited` if the output stream ends before the reply
    /// - `Remote` if the reply carries a non-empty `error`
    pub fn send_request(&mut self, method: &str, params: Value) -> BridgeResult<Value> {
        let id = self.ids.allocate();
        let request = build_request(id, method, params);
        self.write_message(&request)?;

        log::trace!(
            target: "brain_bridge::transport",
            "Sent {} request id={}",
            method,
            id
        );

        let response = self.read_response(id)?;
        if let Some(error) = response_error(&response) {
            return Err(BridgeError::remote(error));
        }

        Ok(match response {
            Value::Object(mut fields) => fields.remove("result").unwrap_or(Value::Null),
            _ => Value::Null,
        })
    }

    /// Send a notification. No reply is awaited.
    pub fn send_notification(&mut self, method: &str, params: Value) -> BridgeResult<()> {
        let notification = build_notification(method, params);
        self.write_message(&notification)?;

        log::trace!(
            target: "brain_bridge::transport",
            "Sent {} notification",
            method
        );
        Ok(())
    }

    /// Call a tool and unwrap its content envelope.
    pub fn call_tool(&mut self, name: &str, arguments: Value) -> BridgeResult<ToolDocument> {
        let result = self.send_request(TOOLS_CALL_METHOD, tool_call_params(name, arguments))?;
        Ok(ToolDocument::from_call_result(result))
    }

    /// Write one line and flush so the server sees the newline immediately.
    fn write_message(&mut self, message: &Value) -> BridgeResult<()> {
        let line = encode_line(message)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_response(&mut self, id: RequestId) -> BridgeResult<Value> {
        let mut line = Vec::new();
        loop {
            line.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut line)?;
            if bytes_read == 0 {
                return Err(BridgeError::ProcessExited {
                    id: id.as_i64(),
                    stderr: self.drain_diagnostics(),
                });
            }

            let message: Value = match serde_json::from_slice(&line) {
                Ok(message) => message,
                Err(_) => {
                    log::trace!(
                        target: "brain_bridge::transport",
                        "Skipping non-JSON line ({} bytes) while waiting for id={}",
                        bytes_read,
                        id
                    );
                    continue;
                }
            };

            if id.matches(&message) {
                return Ok(message);
            }

            log::trace!(
                target: "brain_bridge::transport",
                "Skipping message with id {:?} while waiting for id={}",
                message.get("id"),
                id
            );
        }
    }

    fn drain_diagnostics(&mut self) -> String {
        let Some(stream) = self.diagnostics.as_mut() else {
            return String::new();
        };

        let mut buf = Vec::new();
        if let Err(e) = stream.by_ref().take(MAX_DIAGNOSTIC_BYTES).read_to_end(&mut buf) {
            log::debug!(
                target: "brain_bridge::transport",
                "Failed to read Brain MCP stderr: {}",
                e
            );
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
