//! Contracts for the external collaborators the lifecycle depends on.
//!
//! None of these resources are transactional. Implementations live in
//! `orchard-shell` (git, tmux, `sh`, file copy); tests substitute in-memory
//! fakes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure reported by a worktree, session, script or file-sync collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{tool} {action} failed: {message}")]
pub struct ExternalError {
    pub tool: String,
    pub action: String,
    pub message: String,
}

impl ExternalError {
    pub fn new(
        tool: impl Into<String>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            message: message.into(),
        }
    }
}

/// Environment variables handed to scripts and background sessions.
pub type Env = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Version control
// ---------------------------------------------------------------------------

/// One entry of the worktree list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    /// Short branch name; `None` for a detached HEAD.
    pub branch: Option<String>,
    pub bare: bool,
    /// Git reports the worktree directory as missing.
    pub prunable: bool,
}

impl WorktreeEntry {
    /// Listed and still present on disk.
    pub fn is_live(&self) -> bool {
        !self.prunable && self.path.exists()
    }
}

/// Arguments for [`Vcs::add_worktree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWorktree {
    pub path: PathBuf,
    pub branch: String,
    /// Create `branch` instead of checking out an existing one.
    pub create_branch: bool,
    /// Start point for a newly created branch.
    pub start_point: Option<String>,
}

/// Primitive worktree and branch operations, each consumed as an atomic step.
pub trait Vcs: Send + Sync {
    /// Shared metadata directory common to every worktree of the repository.
    fn common_dir(&self, dir: &Path) -> Result<PathBuf, ExternalError>;
    /// Path of the primary (root) worktree.
    fn root_worktree(&self, dir: &Path) -> Result<PathBuf, ExternalError>;
    fn list_worktrees(&self, repo: &Path) -> Result<Vec<WorktreeEntry>, ExternalError>;
    fn add_worktree(&self, repo: &Path, request: &AddWorktree) -> Result<(), ExternalError>;
    fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), ExternalError>;
    fn move_worktree(&self, repo: &Path, from: &Path, to: &Path) -> Result<(), ExternalError>;
    fn current_branch(&self, dir: &Path) -> Result<String, ExternalError>;
    fn is_dirty(&self, dir: &Path) -> Result<bool, ExternalError>;
    /// `true` when `branch` is an ancestor of (merged into) `into`.
    fn is_merged(&self, repo: &Path, branch: &str, into: &str) -> Result<bool, ExternalError>;
    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, ExternalError>;
    fn delete_branch(&self, repo: &Path, branch: &str, force: bool) -> Result<(), ExternalError>;
    fn default_branch(&self, repo: &Path) -> Result<String, ExternalError>;
    fn fetch(&self, repo: &Path) -> Result<(), ExternalError>;
}

// ---------------------------------------------------------------------------
// Background sessions, scripts, file sync
// ---------------------------------------------------------------------------

/// Background session manager keyed by a session name.
pub trait Sessions: Send + Sync {
    fn start(&self, key: &str, dir: &Path, command: &str, env: &Env) -> Result<(), ExternalError>;
    fn stop(&self, key: &str) -> Result<(), ExternalError>;
    fn is_running(&self, key: &str) -> Result<bool, ExternalError>;
    fn capture(&self, key: &str, lines: usize) -> Result<String, ExternalError>;
    fn rename(&self, from: &str, to: &str) -> Result<(), ExternalError>;
}

/// Runs a lifecycle hook script to completion.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: &str, dir: &Path, env: &Env) -> Result<(), ExternalError>;
}

/// Copies include-listed files from the root worktree into a new workspace.
pub trait FileSync: Send + Sync {
    /// Returns the number of entries copied.
    fn sync(&self, from: &Path, to: &Path, include: &[String]) -> Result<usize, ExternalError>;
}
