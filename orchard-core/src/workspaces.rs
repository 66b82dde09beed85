//! Per-repository workspace registry.
//!
//! Persisted at `<git-common-dir>/orchard/workspaces.json`, so every worktree
//! of one repository reads and writes the same document. The registry is a
//! cache of the worktree list, not the source of truth: [`WorkspaceRegistry::reconcile`]
//! drops entries whose worktree has disappeared.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::paths::{same_path, workspaces_path};
use crate::store;
use crate::types::{Workspace, WorkspaceName};

pub const SCHEMA_VERSION: u32 = 1;

/// Ordered collection of the workspaces of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRegistry {
    pub version: u32,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

impl Default for WorkspaceRegistry {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            workspaces: Vec::new(),
        }
    }
}

impl WorkspaceRegistry {
    // -- persistence --------------------------------------------------------

    /// Registry document location for a repository's common dir.
    pub fn path_for(common_dir: &Path) -> PathBuf {
        workspaces_path(common_dir)
    }

    pub fn load_at(path: &Path) -> Result<Self, CoreError> {
        store::load(path)
    }

    pub fn save_at(&self, path: &Path) -> Result<(), CoreError> {
        store::save(path, self)
    }

    // -- queries ------------------------------------------------------------

    pub fn find(&self, name: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|ws| ws.name.0 == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// The workspace whose root is `dir` or an ancestor of `dir`.
    ///
    /// Matching is per path component, so `/r/ws1` never matches `/r/ws10`.
    /// Nested roots resolve to the deepest match.
    pub fn find_by_path(&self, dir: &Path) -> Option<&Workspace> {
        let canonical = dir.canonicalize().ok();
        self.workspaces
            .iter()
            .filter(|ws| {
                dir.starts_with(&ws.path)
                    || canonical.as_deref().is_some_and(|c| {
                        c.starts_with(&ws.path)
                            || ws.path.canonicalize().is_ok_and(|root| c.starts_with(root))
                    })
            })
            .max_by_key(|ws| ws.path.components().count())
    }

    /// Starting port of every reserved block.
    pub fn allocated_ports(&self) -> BTreeSet<u16> {
        self.workspaces.iter().map(|ws| ws.port).collect()
    }

    pub fn names(&self) -> Vec<WorkspaceName> {
        self.workspaces.iter().map(|ws| ws.name.clone()).collect()
    }

    // -- mutations ----------------------------------------------------------

    pub fn add(&mut self, workspace: Workspace) -> Result<(), CoreError> {
        if self.contains(&workspace.name.0) {
            return Err(CoreError::WorkspaceExists {
                name: workspace.name.0,
            });
        }
        self.workspaces.push(workspace);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Workspace, CoreError> {
        let index = self
            .workspaces
            .iter()
            .position(|ws| ws.name.0 == name)
            .ok_or_else(|| CoreError::WorkspaceNotFound {
                name: name.to_owned(),
            })?;
        Ok(self.workspaces.remove(index))
    }

    /// Rename `old` to `new`, moving its root to `new_path`. `createdAt`,
    /// branch and port are untouched.
    pub fn rename(
        &mut self,
        old: &str,
        new: &WorkspaceName,
        new_path: PathBuf,
    ) -> Result<&Workspace, CoreError> {
        if old == new.0 {
            return Err(CoreError::SameName {
                name: old.to_owned(),
            });
        }
        if self.contains(&new.0) {
            return Err(CoreError::WorkspaceExists { name: new.0.clone() });
        }
        let ws = self
            .workspaces
            .iter_mut()
            .find(|ws| ws.name.0 == old)
            .ok_or_else(|| CoreError::WorkspaceNotFound {
                name: old.to_owned(),
            })?;
        ws.name = new.clone();
        ws.path = new_path;
        Ok(ws)
    }

    /// Drop every workspace whose root is not in `live` (the worktree list)
    /// and return what was dropped.
    pub fn reconcile(&mut self, live: &[PathBuf]) -> Vec<Workspace> {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.workspaces)
            .into_iter()
            .partition(|ws| live.iter().any(|path| same_path(path, &ws.path)));
        self.workspaces = kept;
        for ws in &dropped {
            tracing::info!(
                workspace = %ws.name,
                path = %ws.path.display(),
                "dropping workspace whose worktree no longer exists",
            );
        }
        dropped
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
