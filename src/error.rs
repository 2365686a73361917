//! Error handling types for brain-bridge
//!
//! Errors in this module describe infrastructure failures of the bridge. They
//! never reach consumers of the composer or the direct queries: the blocking
//! call adapter turns every one of them into "no data".

use std::path::PathBuf;
use std::sync::PoisonError;
use std::time::Duration;
use thiserror::Error;

/// Error type for bridge transport, lifecycle and adapter operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The Brain MCP binary could not be started
    #[error("Failed to spawn {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A standard stream of the child process was not piped
    #[error("Failed to obtain {stream} for Brain MCP process")]
    MissingPipe { stream: &'static str },

    /// The child closed its output before answering the pending request
    #[error("Brain MCP exited before replying to request {id}{}", stderr_suffix(.stderr))]
    ProcessExited { id: i64, stderr: String },

    /// The server answered with a JSON-RPC error object
    #[error("Brain MCP error{}: {message}", code_suffix(.code))]
    Remote { code: Option<i64>, message: String },

    /// The transport has already been released
    #[error("Brain MCP connection is closed")]
    Closed,

    /// A blocking operation did not finish before its deadline
    #[error("Brain MCP did not respond within {0:?}")]
    Timeout(Duration),

    /// The blocking worker running a bridge operation failed
    #[error("Bridge worker failed: {0}")]
    Worker(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(". stderr: {}", stderr)
    }
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code {})", c)).unwrap_or_default()
}

/// Helper trait to recover the guard from a poisoned lock
pub trait LockResultExt<T> {
    /// Recover from a PoisonError, logging which operation triggered it.
    ///
    /// A panic in one bridge call must not make the connection unusable for the
    /// remaining calls of the same review.
    fn recover_poison(self, context: &str) -> T;
}

impl<T> LockResultExt<T> for Result<T, PoisonError<T>> {
    fn recover_poison(self, context: &str) -> T {
        match self {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!(
                    target: "brain_bridge::lock_recovery",
                    "Recovered from poisoned lock in {}",
                    context
                );
                poisoned.into_inner()
            }
        }
    }
}

/// Helper functions for common error patterns
impl BridgeError {
    /// Create a worker error
    pub fn worker(message: impl Into<String>) -> Self {
        BridgeError::Worker(message.into())
    }

    /// Create a remote error from a JSON-RPC error object.
    ///
    /// Missing or mistyped fields fall back to a generic message.
    pub fn remote(error: &serde_json::Value) -> Self {
        let code = error.get("code").and_then(|c| c.as_i64());
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown Brain MCP error")
            .to_string();
        BridgeError::Remote { code, message }
    }
}
