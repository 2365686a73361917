//! Brain MCP process lifecycle.
//!
//! Spawning, the `initialize`/`notifications/initialized` handshake, and
//! teardown of the child process:
//! 1. Spawn the binary with `BRAIN_ROOT` pointing at the data root
//! 2. Send `initialize` and wait for its reply
//! 3. Send `notifications/initialized`
//!
//! Teardown closes the standard streams, asks the process to terminate and
//! reaps it, escalating to a hard kill after a grace period.

use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use super::connector::{Connection, Connector, ToolCaller};
use super::protocol::{
    INITIALIZE_METHOD, INITIALIZED_NOTIFICATION, ToolDocument, initialize_params,
    initialized_params,
};
use super::transport::LineTransport;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};

/// Environment variable telling the server where its data lives.
pub const BRAIN_ROOT_ENV: &str = "BRAIN_ROOT";

/// Time a terminated process gets to exit before it is killed.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

type StdioTransport = LineTransport<ChildStdin, BufReader<ChildStdout>>;

/// Tool caller speaking to a spawned Brain MCP process.
#[derive(Debug)]
pub struct McpSession {
    transport: Option<StdioTransport>,
}

impl ToolCaller for McpSession {
    fn call_tool(&mut self, name: &str, arguments: Value) -> BridgeResult<ToolDocument> {
        self.transport
            .as_mut()
            .ok_or(BridgeError::Closed)?
            .call_tool(name, arguments)
    }

    fn handshake(&mut self) -> BridgeResult<()> {
        let transport = self.transport.as_mut().ok_or(BridgeError::Closed)?;
        let result = perform_handshake(transport)?;
        log::debug!(
            target: "brain_bridge::process",
            "Brain MCP server info: {}",
            result.get("serverInfo").unwrap_or(&Value::Null)
        );
        Ok(())
    }

    fn release(&mut self) {
        if self.transport.take().is_some() {
            log::debug!(
                target: "brain_bridge::process",
                "Closed Brain MCP standard streams"
            );
        }
    }
}

/// Owned handle to the Brain MCP child process.
///
/// `shutdown` is idempotent and is also run on drop.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
    binary: PathBuf,
    finished: bool,
}

impl ChildProcess {
    fn new(child: Child, binary: &Path) -> Self {
        Self {
            child,
            binary: binary.to_path_buf(),
            finished: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Terminate and reap the process.
    ///
    /// Never fails: a process that already exited is only reaped, and every
    /// signal or wait error is logged.
    pub fn shutdown(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        match self.child.try_wait() {
            Ok(Some(status)) => {
                log::debug!(
                    target: "brain_bridge::process",
                    "Brain MCP {} already exited with {}",
                    self.binary.display(),
                    status
                );
                return;
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!(
                    target: "brain_bridge::process",
                    "Failed to poll Brain MCP {}: {}",
                    self.binary.display(),
                    e
                );
            }
        }

        self.terminate();
        if self.wait_with_grace(TERMINATE_GRACE) {
            return;
        }

        log::warn!(
            target: "brain_bridge::process",
            "Brain MCP {} (pid {}) ignored termination for {:?}, killing",
            self.binary.display(),
            self.child.id(),
            TERMINATE_GRACE
        );
        if let Err(e) = self.child.kill() {
            log::debug!(
                target: "brain_bridge::process",
                "Kill failed (process likely exited): {}",
                e
            );
        }
        if let Err(e) = self.child.wait() {
            log::warn!(
                target: "brain_bridge::process",
                "Failed to reap Brain MCP {}: {}",
                self.binary.display(),
                e
            );
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let pid = Pid::from_raw(self.child.id() as i32);
        if let Err(e) = kill(pid, Signal::SIGTERM) {
            log::debug!(
                target: "brain_bridge::process",
                "SIGTERM to pid {} failed: {}",
                pid,
                e
            );
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!(
                target: "brain_bridge::process",
                "Terminate failed (process likely exited): {}",
                e
            );
        }
    }

    /// Poll for exit until `grace` elapses. Returns true once reaped.
    fn wait_with_grace(&mut self, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    log::debug!(
                        target: "brain_bridge::process",
                        "Brain MCP {} exited with {}",
                        self.binary.display(),
                        status
                    );
                    return true;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(EXIT_POLL_INTERVAL);
                }
                Ok(None) => return false,
                Err(e) => {
                    log::warn!(
                        target: "brain_bridge::process",
                        "Failed to wait for Brain MCP {}: {}",
                        self.binary.display(),
                        e
                    );
                    return false;
                }
            }
        }
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Perform the `initialize` / `notifications/initialized` handshake.
///
/// Returns the server's `initialize` result.
pub(crate) fn perform_handshake<W: Write, R: BufRead>(
    transport: &mut LineTransport<W, R>,
) -> BridgeResult<Value> {
    let result = transport.send_request(INITIALIZE_METHOD, initialize_params())?;
    transport.send_notification(INITIALIZED_NOTIFICATION, initialized_params())?;
    Ok(result)
}

/// Spawn the Brain MCP binary with piped standard streams.
///
/// No protocol traffic happens here; run [`ToolCaller::handshake`] on the
/// returned caller before issuing tool calls.
pub fn spawn_process(
    binary: &Path,
    args: &[String],
    root: &Path,
) -> BridgeResult<Connection<McpSession>> {
    let (session, process) = spawn_child(binary, args, root)?;
    Ok(Connection::new(session, process))
}

fn spawn_child(
    binary: &Path,
    args: &[String],
    root: &Path,
) -> BridgeResult<(McpSession, ChildProcess)> {
    let child = Command::new(binary)
        .args(args)
        .env(BRAIN_ROOT_ENV, root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| BridgeError::Spawn {
            binary: binary.to_path_buf(),
            source,
        })?;

    let mut process = ChildProcess::new(child, binary);

    let stdin = process
        .child
        .stdin
        .take()
        .ok_or(BridgeError::MissingPipe { stream: "stdin" })?;
    let stdout = process
        .child
        .stdout
        .take()
        .ok_or(BridgeError::MissingPipe { stream: "stdout" })?;
    let stderr = process
        .child
        .stderr
        .take()
        .ok_or(BridgeError::MissingPipe { stream: "stderr" })?;

    log::debug!(
        target: "brain_bridge::process",
        "Spawned Brain MCP {} (pid {})",
        binary.display(),
        process.id()
    );

    let transport = LineTransport::new(stdin, BufReader::new(stdout)).with_diagnostics(stderr);
    let session = McpSession {
        transport: Some(transport),
    };
    Ok((session, process))
}

/// Spawn the Brain MCP binary and complete the handshake.
///
/// Blocking with no deadline of its own. On handshake failure the process is
/// shut down before the error is returned, so no orphan is left behind.
pub fn spawn_connection(
    binary: &Path,
    args: &[String],
    root: &Path,
) -> BridgeResult<Connection<McpSession>> {
    let (mut session, mut process) = spawn_child(binary, args, root)?;

    if let Err(e) = session.handshake() {
        log::warn!(
            target: "brain_bridge::process",
            "Handshake with Brain MCP {} failed: {}",
            binary.display(),
            e
        );
        session.release();
        process.shutdown();
        return Err(e);
    }

    log::info!(
        target: "brain_bridge::process",
        "Connected to Brain MCP {} (pid {})",
        binary.display(),
        process.id()
    );

    Ok(Connection::new(session, process))
}

/// Connector that spawns the configured Brain MCP binary.
#[derive(Debug, Clone)]
pub struct ProcessConnector {
    binary: PathBuf,
    args: Vec<String>,
    root: PathBuf,
}

impl ProcessConnector {
    pub fn new(binary: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            root: root.into(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.mcp_bin.clone(), config.mcp_root.clone()).with_args(config.mcp_args.clone())
    }
}

impl Connector for ProcessConnector {
    type Caller = McpSession;

    fn connect(&self) -> BridgeResult<Connection<McpSession>> {
        spawn_process(&self.binary, &self.args, &self.root)
    }
}
