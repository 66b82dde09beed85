//! The [`Lifecycle`] handle and per-repository context.
//!
//! ## Registry loading
//!
//! [`Lifecycle::load_workspaces`] treats the registry as a cache of the
//! worktree list: entries whose worktree is gone are dropped and the
//! corrected document is saved back before anything else reads it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use orchard_core::external::{FileSync, ScriptRunner, Sessions, Vcs};
use orchard_core::ports::PortProbe;
use orchard_core::repos::default_repo_name;
use orchard_core::{Config, CoreError, RepoName, RepoRegistry, Repository, WorkspaceRegistry};

use crate::error::LifecycleError;

/// External collaborators the orchestrator drives.
pub struct Collaborators {
    pub vcs: Box<dyn Vcs>,
    pub sessions: Box<dyn Sessions>,
    pub scripts: Box<dyn ScriptRunner>,
    pub files: Box<dyn FileSync>,
    pub probe: Box<dyn PortProbe>,
}

/// One repository as seen by a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    /// Primary worktree.
    pub root: PathBuf,
    /// Shared metadata dir; holds the workspace registry.
    pub common_dir: PathBuf,
    pub name: RepoName,
    pub config: Config,
}

impl RepoContext {
    pub fn registry_path(&self) -> PathBuf {
        WorkspaceRegistry::path_for(&self.common_dir)
    }

    pub fn worktree_base(&self, home: &Path) -> PathBuf {
        self.config.worktree_base(&self.root, home, self.name.as_str())
    }
}

/// Entry point for every lifecycle operation.
pub struct Lifecycle {
    home: PathBuf,
    pub(crate) tools: Collaborators,
}

impl Lifecycle {
    pub fn new(home: impl Into<PathBuf>, tools: Collaborators) -> Self {
        Self {
            home: home.into(),
            tools,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn tools(&self) -> &Collaborators {
        &self.tools
    }

    // -- repositories -------------------------------------------------------

    /// Repository containing `dir`. The registered name is used when the
    /// root is registered, otherwise the root's base name.
    pub fn open_repo(&self, dir: &Path) -> Result<RepoContext, LifecycleError> {
        let root = self.tools.vcs.root_worktree(dir)?;
        let common_dir = self.tools.vcs.common_dir(dir)?;
        let name = match RepoRegistry::load_at(&self.home) {
            Ok(repos) => repos.find_by_path(&root).map(|r| r.name.clone()),
            Err(err) => {
                tracing::warn!(error = %err, "cannot read repository registry");
                None
            }
        }
        .unwrap_or_else(|| default_repo_name(&root));
        let config = Config::load_at(&root)?;
        Ok(RepoContext {
            root,
            common_dir,
            name,
            config,
        })
    }

    /// Context for a registered repository.
    pub fn open_registered(&self, repo: &Repository) -> Result<RepoContext, LifecycleError> {
        let common_dir = self.tools.vcs.common_dir(&repo.path)?;
        let config = Config::load_at(&repo.path)?;
        Ok(RepoContext {
            root: repo.path.clone(),
            common_dir,
            name: repo.name.clone(),
            config,
        })
    }

    pub fn load_repos(&self) -> Result<RepoRegistry, LifecycleError> {
        Ok(RepoRegistry::load_at(&self.home)?)
    }

    // -- workspace registry -------------------------------------------------

    /// Load and reconcile the workspace registry of `ctx`.
    ///
    /// If the worktree list cannot be read the registry is returned as
    /// stored.
    pub fn load_workspaces(&self, ctx: &RepoContext) -> Result<WorkspaceRegistry, LifecycleError> {
        let path = ctx.registry_path();
        let mut registry = WorkspaceRegistry::load_at(&path)?;
        if registry.workspaces.is_empty() {
            return Ok(registry);
        }
        let live = match self.tools.vcs.list_worktrees(&ctx.root) {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.is_live())
                .map(|e| e.path)
                .collect::<Vec<_>>(),
            Err(err) => {
                tracing::warn!(repo = %ctx.name, error = %err, "skipping reconciliation");
                return Ok(registry);
            }
        };
        let dropped = registry.reconcile(&live);
        if !dropped.is_empty() {
            registry.save_at(&path)?;
        }
        Ok(registry)
    }

    /// Every allocated block start across `current` and all registered
    /// repositories. Unreadable registries are skipped with a warning.
    pub fn global_ports(&self, ctx: &RepoContext, current: &WorkspaceRegistry) -> BTreeSet<u16> {
        let mut ports = current.allocated_ports();
        let repos = match RepoRegistry::load_at(&self.home) {
            Ok(repos) => repos,
            Err(err) => {
                tracing::warn!(error = %err, "port survey limited to the current repository");
                return ports;
            }
        };
        for repo in &repos.repositories {
            if orchard_core::paths::same_path(&repo.path, &ctx.root) {
                continue;
            }
            match self.registry_of(repo) {
                Ok(registry) => ports.extend(registry.allocated_ports()),
                Err(err) => tracing::warn!(
                    repo = %repo.name,
                    error = %err,
                    "port survey skipped repository",
                ),
            }
        }
        ports
    }

    /// Stored (unreconciled) registry of a registered repository.
    pub(crate) fn registry_of(&self, repo: &Repository) -> Result<WorkspaceRegistry, CoreError> {
        let common_dir = self.tools.vcs.common_dir(&repo.path)?;
        WorkspaceRegistry::load_at(&WorkspaceRegistry::path_for(&common_dir))
    }
}
