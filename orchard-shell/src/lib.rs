//! orchard-shell: process-backed implementations of the collaborator traits
//! declared in `orchard_core::external`.
//!
//! - [`GitCli`]: worktrees and branches via the `git` binary
//! - [`TmuxSessions`]: background run sessions via `tmux`
//! - [`ShellScripts`]: lifecycle hooks via `sh -c`
//! - [`CopyFiles`]: include-listed file copy from the root worktree

mod command;
pub mod copy;
pub mod git;
pub mod script;
pub mod tmux;

pub use copy::CopyFiles;
pub use git::GitCli;
pub use script::ShellScripts;
pub use tmux::TmuxSessions;
