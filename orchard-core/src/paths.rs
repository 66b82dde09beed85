//! Storage layout.
//!
//! ```text
//! ~/.orchard/
//!   repos.json                 (global repository registry)
//!   worktrees/<repo>/<name>/   (default worktree base)
//! <git-common-dir>/orchard/
//!   workspaces.json            (per-repository workspace registry)
//! ```
//!
//! Every `<doc>` has transient `<doc>.lock` and `<doc>.tmp` siblings.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

pub const ORCHARD_DIR: &str = ".orchard";
pub const REPOS_FILE: &str = "repos.json";
pub const WORKSPACES_DIR: &str = "orchard";
pub const WORKSPACES_FILE: &str = "workspaces.json";
pub const CONFIG_FILE: &str = ".orchard.yaml";

pub fn orchard_root(home: &Path) -> PathBuf {
    home.join(ORCHARD_DIR)
}

/// `<home>/.orchard/repos.json`
pub fn repos_path(home: &Path) -> PathBuf {
    orchard_root(home).join(REPOS_FILE)
}

/// `<home>/.orchard/worktrees/<repo>`
pub fn default_worktree_base(home: &Path, repo: &str) -> PathBuf {
    orchard_root(home).join("worktrees").join(repo)
}

/// `<common-dir>/orchard/workspaces.json`
pub fn workspaces_path(common_dir: &Path) -> PathBuf {
    common_dir.join(WORKSPACES_DIR).join(WORKSPACES_FILE)
}

/// `<repo-root>/.orchard.yaml`
pub fn config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(CONFIG_FILE)
}

/// `<doc>.lock`
pub fn lock_path(doc: &Path) -> PathBuf {
    with_suffix(doc, ".lock")
}

/// `<doc>.tmp`
pub fn tmp_path(doc: &Path) -> PathBuf {
    with_suffix(doc, ".tmp")
}

fn with_suffix(doc: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = doc.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// `true` when both paths name the same location, comparing canonical forms
/// when both exist (macOS `/var` vs `/private/var`, symlinked homes).
pub fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Canonical form when the path exists, the input otherwise.
pub fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

pub fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}
