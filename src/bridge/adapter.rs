//! Async adapter over a blocking tool caller.
//!
//! Every call runs on the blocking pool under a deadline and is reduced to an
//! `Option`: failures, panics and timeouts are logged and become `None`. One
//! mutex serializes all calls on the same connection.

use serde_json::Value;
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use super::connector::ToolCaller;
use super::protocol::ToolDocument;
use crate::error::{BridgeResult, LockResultExt};

pub struct BlockingCallAdapter<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for BlockingCallAdapter<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> std::fmt::Debug for BlockingCallAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingCallAdapter").finish_non_exhaustive()
    }
}

impl<C: ToolCaller> BlockingCallAdapter<C> {
    pub fn new(caller: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(caller)),
        }
    }

    /// Run `op` against the caller on the blocking pool.
    ///
    /// Returns `None` when `op` fails, panics, or does not finish within
    /// `timeout`. A timed-out call keeps the connection locked until the
    /// blocking operation returns, so later calls queue behind it.
    pub async fn run<T, F>(&self, label: &str, timeout: Duration, op: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> BridgeResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let result = tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || {
                let mut caller = inner.lock().recover_poison("BlockingCallAdapter::run");
                op(&mut *caller)
            }),
        )
        .await;

        match result {
            Ok(Ok(Ok(value))) => Some(value),
            Ok(Ok(Err(e))) => {
                log::warn!(
                    target: "brain_bridge::adapter",
                    "Brain MCP call {} failed: {}",
                    label,
                    e
                );
                None
            }
            Ok(Err(join_error)) => {
                log::error!(
                    target: "brain_bridge::adapter",
                    "Brain MCP call {} panicked: {}",
                    label,
                    join_error
                );
                None
            }
            Err(_elapsed) => {
                log::warn!(
                    target: "brain_bridge::adapter",
                    "Brain MCP call {} timed out after {:?}",
                    label,
                    timeout
                );
                None
            }
        }
    }

    /// Call one tool, yielding `None` on any failure.
    pub async fn call_safe(
        &self,
        name: &str,
        arguments: Value,
        timeout: Duration,
    ) -> Option<ToolDocument> {
        let tool = name.to_string();
        self.run(name, timeout, move |caller| caller.call_tool(&tool, arguments))
            .await
    }

    /// Run `op` only if the caller is not busy.
    ///
    /// Used on teardown, where waiting for a stuck call would defeat the
    /// purpose. A poisoned lock is taken over.
    pub fn try_with<T>(&self, op: impl FnOnce(&mut C) -> T) -> Option<T> {
        match self.inner.try_lock() {
            Ok(mut caller) => Some(op(&mut *caller)),
            Err(TryLockError::Poisoned(poisoned)) => {
                log::warn!(
                    target: "brain_bridge::lock_recovery",
                    "Recovered from poisoned lock in BlockingCallAdapter::try_with"
                );
                let mut caller = poisoned.into_inner();
                Some(op(&mut *caller))
            }
            Err(TryLockError::WouldBlock) => None,
        }
    }
}
