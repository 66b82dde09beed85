//! [`ScriptRunner`] that runs hook scripts through `sh -c`.
//!
//! Output is captured rather than inherited: the agent server speaks its
//! protocol on stdout and must not have script output interleaved.

use std::path::Path;
use std::process::Command;

use orchard_core::external::{Env, ScriptRunner};
use orchard_core::ExternalError;

use crate::command::capture;

#[derive(Debug, Clone)]
pub struct ShellScripts {
    pub shell: String,
}

impl Default for ShellScripts {
    fn default() -> Self {
        Self {
            shell: "sh".to_owned(),
        }
    }
}

impl ScriptRunner for ShellScripts {
    fn run(&self, script: &str, dir: &Path, env: &Env) -> Result<(), ExternalError> {
        let output = capture(
            &self.shell,
            "script",
            Command::new(&self.shell)
                .arg("-c")
                .arg(script)
                .current_dir(dir)
                .envs(env),
        )?;
        if !output.is_empty() {
            tracing::debug!(script, output = %output, "script finished");
        }
        Ok(())
    }
}
