//! Wiring shared by every command: home directory, collaborators, cwd.

use std::path::PathBuf;

use anyhow::{Context, Result};

use orchard_core::ports::TcpProbe;
use orchard_lifecycle::{Collaborators, Lifecycle};
use orchard_shell::{CopyFiles, GitCli, ShellScripts, TmuxSessions};

pub fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub fn cwd() -> Result<PathBuf> {
    std::env::current_dir().context("could not read the current directory")
}

/// Lifecycle backed by `git`, `tmux` and `sh`.
pub fn lifecycle() -> Result<Lifecycle> {
    Ok(Lifecycle::new(
        home()?,
        Collaborators {
            vcs: Box::new(GitCli::new()),
            sessions: Box::new(TmuxSessions::new()),
            scripts: Box::new(ShellScripts::default()),
            files: Box::new(CopyFiles::new()),
            probe: Box::new(TcpProbe::default()),
        },
    ))
}
