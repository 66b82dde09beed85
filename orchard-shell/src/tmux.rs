//! [`Sessions`] backed by detached `tmux` sessions.

use std::path::Path;
use std::process::Command;

use orchard_core::external::{Env, Sessions};
use orchard_core::ExternalError;

use crate::command::{capture, probe};

const TOOL: &str = "tmux";

#[derive(Debug, Clone, Default)]
pub struct TmuxSessions;

impl TmuxSessions {
    pub fn new() -> Self {
        Self
    }
}

/// Exact-match session target; a bare name would also match prefixes.
fn exact(key: &str) -> String {
    format!("={key}")
}

/// Active pane of the exactly matched session.
fn exact_pane(key: &str) -> String {
    format!("{}:", exact(key))
}

impl Sessions for TmuxSessions {
    fn start(&self, key: &str, dir: &Path, command: &str, env: &Env) -> Result<(), ExternalError> {
        let mut cmd = Command::new(TOOL);
        cmd.args(["new-session", "-d", "-s", key, "-c"]).arg(dir);
        for (name, value) in env {
            cmd.arg("-e").arg(format!("{name}={value}"));
        }
        cmd.arg(command);
        capture(TOOL, "new-session", &mut cmd)?;
        // Keep the pane after the command exits so its output stays readable.
        capture(
            TOOL,
            "set-option",
            Command::new(TOOL).args(["set-option", "-t", &exact(key), "remain-on-exit", "on"]),
        )
        .map(drop)
    }

    fn stop(&self, key: &str) -> Result<(), ExternalError> {
        capture(
            TOOL,
            "kill-session",
            Command::new(TOOL).args(["kill-session", "-t", &exact(key)]),
        )
        .map(drop)
    }

    fn is_running(&self, key: &str) -> Result<bool, ExternalError> {
        probe(
            TOOL,
            "has-session",
            Command::new(TOOL).args(["has-session", "-t", &exact(key)]),
        )
    }

    fn capture(&self, key: &str, lines: usize) -> Result<String, ExternalError> {
        let start = format!("-{lines}");
        capture(
            TOOL,
            "capture-pane",
            Command::new(TOOL).args([
                "capture-pane",
                "-p",
                "-J",
                "-t",
                &exact_pane(key),
                "-S",
                &start,
            ]),
        )
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), ExternalError> {
        capture(
            TOOL,
            "rename-session",
            Command::new(TOOL).args(["rename-session", "-t", &exact(from), to]),
        )
        .map(drop)
    }
}
