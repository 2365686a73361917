//! In-memory callers and connectors for unit tests.

use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::connector::{Connection, Connector, ToolCaller};
use super::protocol::ToolDocument;
use crate::error::{BridgeError, BridgeResult};

/// Caller recording every call and answering from scripted replies.
///
/// Tools without a scripted reply fail with a remote error.
#[derive(Clone, Default)]
pub(crate) struct RecordingCaller {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    replies: Arc<Mutex<HashMap<String, Value>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    releases: Arc<AtomicUsize>,
    panic_on_release: bool,
}

impl RecordingCaller {
    pub(crate) fn reply(self, tool: &str, value: Value) -> Self {
        self.replies.lock().unwrap().insert(tool.to_string(), value);
        self
    }

    /// Make `tool` block for `delay` before answering.
    pub(crate) fn slow(self, tool: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(tool.to_string(), delay);
        self
    }

    pub(crate) fn panicking_on_release(mut self) -> Self {
        self.panic_on_release = true;
        self
    }

    pub(crate) fn recorded(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ToolCaller for RecordingCaller {
    fn call_tool(&mut self, name: &str, arguments: Value) -> BridgeResult<ToolDocument> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));

        let delay = self.delays.lock().unwrap().get(name).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        self.replies
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .map(ToolDocument::from_call_result)
            .ok_or_else(|| BridgeError::Remote {
                code: None,
                message: format!("no reply scripted for {}", name),
            })
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_release {
            panic!("release exploded");
        }
    }
}

/// Connector handing out clones of one `RecordingCaller`, or refusing.
pub(crate) struct FakeConnector {
    caller: Option<RecordingCaller>,
    connects: AtomicUsize,
}

impl FakeConnector {
    pub(crate) fn serving(caller: RecordingCaller) -> Arc<Self> {
        Arc::new(Self {
            caller: Some(caller),
            connects: AtomicUsize::new(0),
        })
    }

    pub(crate) fn refusing() -> Arc<Self> {
        Arc::new(Self {
            caller: None,
            connects: AtomicUsize::new(0),
        })
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for FakeConnector {
    type Caller = RecordingCaller;

    fn connect(&self) -> BridgeResult<Connection<RecordingCaller>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.caller {
            Some(caller) => Ok(Connection::detached(caller.clone())),
            None => Err(BridgeError::Spawn {
                binary: PathBuf::from("brain-mcp"),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
        }
    }
}
