//! Dual-mode workspace resolution.
//!
//! The CLI resolves locally whenever its directory is inside a repository
//! and falls back to global lookup only when it is not. The agent server has
//! no meaningful directory and always resolves globally.

use std::path::Path;

use orchard_core::{resolver, CoreError, Workspace};

use crate::context::{Lifecycle, RepoContext};
use crate::error::LifecycleError;

/// A workspace together with the repository that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub ctx: RepoContext,
    pub workspace: Workspace,
}

impl Lifecycle {
    /// Resolve from the caller's directory. `repo` forces global lookup in
    /// that repository.
    pub fn resolve(
        &self,
        cwd: &Path,
        name: Option<&str>,
        repo: Option<&str>,
    ) -> Result<Resolved, LifecycleError> {
        if repo.is_some() {
            let name = name.ok_or_else(|| CoreError::NotInWorkspace {
                dir: cwd.to_path_buf(),
            })?;
            return self.resolve_global(name, repo);
        }
        match self.open_repo(cwd) {
            Ok(ctx) => {
                let workspace = self.resolve_local(&ctx, name, cwd)?;
                Ok(Resolved { ctx, workspace })
            }
            Err(LifecycleError::External(err)) => {
                tracing::debug!(dir = %cwd.display(), error = %err, "not in a repository");
                let name = name.ok_or_else(|| CoreError::NotInWorkspace {
                    dir: cwd.to_path_buf(),
                })?;
                self.resolve_global(name, None)
            }
            Err(err) => Err(err),
        }
    }

    /// Local resolution against the reconciled registry of `ctx`.
    pub fn resolve_local(
        &self,
        ctx: &RepoContext,
        name: Option<&str>,
        cwd: &Path,
    ) -> Result<Workspace, LifecycleError> {
        let registry = self.load_workspaces(ctx)?;
        Ok(resolver::resolve_local(&registry, name, cwd)?.clone())
    }

    /// Global resolution by name, optionally scoped to one repository.
    pub fn resolve_global(
        &self,
        name: &str,
        repo: Option<&str>,
    ) -> Result<Resolved, LifecycleError> {
        let repos = self.load_repos()?;
        let (repository, workspace) =
            resolver::resolve_global(&repos, name, repo, |r| self.registry_of(r))?;
        let ctx = self.open_registered(&repository)?;
        Ok(Resolved { ctx, workspace })
    }
}
