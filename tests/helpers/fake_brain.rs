//! Scripted Brain MCP servers for E2E tests.
//!
//! Each fake is a `/bin/sh` script reading one request line at a time and
//! printing canned replies. The script is launched as `/bin/sh <script>`, so
//! nothing needs the executable bit.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use brain_bridge::config::BridgeConfig;

enum Step {
    /// Consume one request or notification line
    Read,
    /// Print a line verbatim
    Print(String),
    /// Raw shell command
    Shell(String),
}

/// Builder for a scripted server.
///
/// The handshake (`initialize` reply plus consuming the `initialized`
/// notification) is always scripted first. Tool replies are numbered from
/// request id 2 onwards.
pub struct FakeBrain {
    steps: Vec<Step>,
    next_id: i64,
    keep_alive: bool,
}

impl FakeBrain {
    pub fn new() -> Self {
        let mut fake = Self {
            steps: Vec::new(),
            next_id: 2,
            keep_alive: true,
        };
        fake.steps.push(Step::Read);
        fake.steps.push(Step::Print(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": "fake-brain", "version": "0.0.0"}
                }
            })
            .to_string(),
        ));
        fake.steps.push(Step::Read);
        fake
    }

    /// A server that dies before answering `initialize`.
    pub fn dead_on_arrival(stderr: &str) -> Self {
        Self {
            steps: vec![
                Step::Read,
                Step::Shell(format!("echo {} >&2", shell_quote(stderr))),
                Step::Shell("exit 3".to_string()),
            ],
            next_id: 1,
            keep_alive: false,
        }
    }

    /// A server that records its pid in `pid_file` and never answers
    /// `initialize`; the process only ends when signalled.
    pub fn unresponsive(pid_file: &Path) -> Self {
        let pid_file = shell_quote(&pid_file.display().to_string());
        Self {
            steps: vec![
                Step::Shell(format!("echo $$ > {}", pid_file)),
                Step::Shell("exec sleep 60".to_string()),
            ],
            next_id: 1,
            keep_alive: false,
        }
    }

    /// Answer the next tool call with a JSON payload.
    pub fn tool_json(self, payload: Value) -> Self {
        self.tool_text(&payload.to_string())
    }

    /// Answer the next tool call with arbitrary text content.
    pub fn tool_text(mut self, text: &str) -> Self {
        let id = self.take_id();
        self.steps.push(Step::Read);
        self.steps.push(Step::Print(text_reply(id, text)));
        self
    }

    /// Answer the next tool call after unrelated and malformed lines.
    pub fn noisy_tool_json(mut self, payload: Value) -> Self {
        let id = self.take_id();
        self.steps.push(Step::Read);
        self.steps.push(Step::Print("Brain MCP warming caches...".to_string()));
        self.steps.push(Step::Print(
            json!({"jsonrpc": "2.0", "method": "notifications/message", "params": {"level": "info"}})
                .to_string(),
        ));
        self.steps
            .push(Step::Print(text_reply(id + 100, r#"{"stale": true}"#)));
        self.steps
            .push(Step::Print(text_reply(id, &payload.to_string())));
        self
    }

    /// Answer the next tool call with a JSON-RPC error.
    pub fn tool_error(mut self, message: &str) -> Self {
        let id = self.take_id();
        self.steps.push(Step::Read);
        self.steps.push(Step::Print(
            json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32000, "message": message}})
                .to_string(),
        ));
        self
    }

    /// Answer the next tool call with the value of `BRAIN_ROOT` as plain text.
    pub fn echo_brain_root(mut self) -> Self {
        let id = self.take_id();
        self.steps.push(Step::Read);
        self.steps.push(Step::Shell(format!(
            "printf '{{\"jsonrpc\":\"2.0\",\"id\":{},\"result\":{{\"content\":[{{\"type\":\"text\",\"text\":\"%s\"}}]}}}}\\n' \"$BRAIN_ROOT\"",
            id
        )));
        self
    }

    /// Exit with a stderr message after reading the next request.
    pub fn die_on_next_call(mut self, stderr: &str) -> Self {
        self.take_id();
        self.steps.push(Step::Read);
        self.steps
            .push(Step::Shell(format!("echo {} >&2", shell_quote(stderr))));
        self.steps.push(Step::Shell("exit 1".to_string()));
        self.keep_alive = false;
        self
    }

    /// Never answer the next request; the process only ends when signalled.
    pub fn hang_on_next_call(mut self) -> Self {
        self.take_id();
        self.steps.push(Step::Read);
        self.steps.push(Step::Shell("exec sleep 30".to_string()));
        self.keep_alive = false;
        self
    }

    /// Write the script into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let mut script = String::from("#!/bin/sh\n");
        for step in &self.steps {
            match step {
                Step::Read => script.push_str("read -r line || exit 0\n"),
                Step::Print(line) => {
                    script.push_str(&format!("printf '%s\\n' {}\n", shell_quote(line)))
                }
                Step::Shell(command) => {
                    script.push_str(command);
                    script.push('\n');
                }
            }
        }
        if self.keep_alive {
            script.push_str("cat >/dev/null\n");
        }

        let path = dir.join("fake-brain.sh");
        std::fs::write(&path, script).expect("write fake brain script");
        path
    }

    /// Configuration launching this fake through `/bin/sh`.
    pub fn config(&self, dir: &Path) -> BridgeConfig {
        let script = self.write_to(dir);
        BridgeConfig {
            enable: true,
            mcp_bin: PathBuf::from("/bin/sh"),
            mcp_args: vec![script.display().to_string()],
            mcp_root: dir.join("brain-root"),
            timeout_seconds: 5.0,
            ..Default::default()
        }
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn text_reply(id: i64, text: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {"content": [{"type": "text", "text": text}]}
    })
    .to_string()
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
