//! Seams between the façade and whatever actually answers tool calls.
//!
//! `ToolCaller` is one blocking request/response channel. `Connector`
//! produces callers that still need their handshake, which lets the composer
//! and query handlers run against a spawned process in production and against
//! scripted fakes in tests.

use serde_json::Value;

use super::process::ChildProcess;
use super::protocol::ToolDocument;
use crate::error::BridgeResult;

/// Blocking tool-call channel.
pub trait ToolCaller: Send + 'static {
    fn call_tool(&mut self, name: &str, arguments: Value) -> BridgeResult<ToolDocument>;

    /// Complete protocol initialization before the first call.
    fn handshake(&mut self) -> BridgeResult<()> {
        Ok(())
    }

    /// Release the underlying streams. Later calls should fail with `Closed`.
    fn release(&mut self) {}
}

/// Factory for connections.
pub trait Connector: Send + Sync + 'static {
    type Caller: ToolCaller;

    /// Start a connection without handshaking.
    ///
    /// Blocking but short. The process, if any, is owned by the returned
    /// `Connection` before any protocol traffic happens, so a handshake that
    /// never completes can still be torn down.
    fn connect(&self) -> BridgeResult<Connection<Self::Caller>>;
}

/// A caller plus the process backing it, if any.
#[derive(Debug)]
pub struct Connection<C> {
    caller: C,
    process: Option<ChildProcess>,
}

impl<C> Connection<C> {
    pub fn new(caller: C, process: ChildProcess) -> Self {
        Self {
            caller,
            process: Some(process),
        }
    }

    /// Connection with no owned process (in-memory callers).
    pub fn detached(caller: C) -> Self {
        Self {
            caller,
            process: None,
        }
    }

    pub fn into_parts(self) -> (C, Option<ChildProcess>) {
        (self.caller, self.process)
    }
}
