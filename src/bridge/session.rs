//! One Brain MCP session: a connected façade plus the process behind it.
//!
//! `open` spawns, then runs the handshake under the per-call deadline; `close`
//! releases the streams and reaps the process. Both a failed `open` and
//! `close` reap the process before returning. `close` is idempotent, and a
//! session dropped without `close` still reaps its process through
//! `ChildProcess`'s `Drop`.

use std::sync::{Arc, Mutex};

use super::adapter::BlockingCallAdapter;
use super::connector::{Connector, ToolCaller};
use super::facade::BrainClient;
use super::process::ChildProcess;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult, LockResultExt};

pub struct BridgeSession<C> {
    client: BrainClient<C>,
    process: Mutex<Option<ChildProcess>>,
}

impl<C> std::fmt::Debug for BridgeSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSession")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl<C: ToolCaller> BridgeSession<C> {
    /// Connect and handshake, bounded by the configured call timeout.
    ///
    /// The process is owned here before the handshake starts. If the
    /// handshake fails or outlives the deadline the process is terminated,
    /// which also ends the abandoned blocking read.
    pub async fn open<K>(connector: Arc<K>, config: &BridgeConfig) -> BridgeResult<Self>
    where
        K: Connector<Caller = C>,
    {
        let timeout = config.call_timeout();
        let connection = tokio::task::spawn_blocking(move || connector.connect())
            .await
            .map_err(|join_error| BridgeError::worker(join_error.to_string()))??;
        let (mut caller, process) = connection.into_parts();

        let handshake = tokio::task::spawn_blocking(move || caller.handshake().map(|()| caller));
        let error = match tokio::time::timeout(timeout, handshake).await {
            Ok(Ok(Ok(caller))) => {
                return Ok(Self {
                    client: BrainClient::new(BlockingCallAdapter::new(caller), config),
                    process: Mutex::new(process),
                });
            }
            Ok(Ok(Err(e))) => e,
            Ok(Err(join_error)) => BridgeError::worker(join_error.to_string()),
            Err(_elapsed) => BridgeError::Timeout(timeout),
        };

        log::warn!(
            target: "brain_bridge::process",
            "Brain MCP handshake did not complete: {}",
            error
        );
        reap(process).await;
        Err(error)
    }

    pub fn client(&self) -> &BrainClient<C> {
        &self.client
    }

    /// Release streams and reap the process.
    pub async fn close(&self) {
        if self
            .client
            .adapter()
            .try_with(|caller| caller.release())
            .is_none()
        {
            log::debug!(
                target: "brain_bridge::process",
                "Connection busy with an abandoned call; terminating without releasing streams"
            );
        }

        let process = self
            .process
            .lock()
            .recover_poison("BridgeSession::close")
            .take();
        reap(process).await;
    }
}

/// Shut the process down on the blocking pool.
async fn reap(process: Option<ChildProcess>) {
    let Some(mut process) = process else {
        return;
    };

    if let Err(e) = tokio::task::spawn_blocking(move || process.shutdown()).await {
        log::error!(
            target: "brain_bridge::process",
            "Brain MCP shutdown task failed: {}",
            e
        );
    }
}
