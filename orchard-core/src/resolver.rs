//! Workspace resolution.
//!
//! - **Local**: one repository's registry plus the caller's directory. A name
//!   is looked up directly; without one the directory must sit inside a
//!   workspace root.
//! - **Global**: a required name, optionally scoped to one repository. With
//!   no repository the registries are searched in registration order and the
//!   first match wins; callers disambiguate by naming the repository.

use std::path::Path;

use crate::error::CoreError;
use crate::repos::RepoRegistry;
use crate::types::{Repository, Workspace};
use crate::workspaces::WorkspaceRegistry;

pub fn resolve_local<'r>(
    registry: &'r WorkspaceRegistry,
    name: Option<&str>,
    cwd: &Path,
) -> Result<&'r Workspace, CoreError> {
    match name {
        Some(name) => registry
            .find(name)
            .ok_or_else(|| CoreError::WorkspaceNotFound {
                name: name.to_owned(),
            }),
        None => registry
            .find_by_path(cwd)
            .ok_or_else(|| CoreError::NotInWorkspace {
                dir: cwd.to_path_buf(),
            }),
    }
}

/// Global lookup. `load` fetches a repository's workspace registry; when a
/// repository is named its load errors propagate, otherwise a repository
/// that cannot be loaded is skipped with a warning.
pub fn resolve_global<F>(
    repos: &RepoRegistry,
    name: &str,
    repo: Option<&str>,
    mut load: F,
) -> Result<(Repository, Workspace), CoreError>
where
    F: FnMut(&Repository) -> Result<WorkspaceRegistry, CoreError>,
{
    if let Some(repo_name) = repo {
        let repository = repos
            .find(repo_name)
            .ok_or_else(|| CoreError::RepoNotFound {
                name: repo_name.to_owned(),
            })?;
        let registry = load(repository)?;
        let workspace = registry
            .find(name)
            .cloned()
            .ok_or_else(|| CoreError::WorkspaceNotFound {
                name: name.to_owned(),
            })?;
        return Ok((repository.clone(), workspace));
    }

    for repository in &repos.repositories {
        let registry = match load(repository) {
            Ok(registry) => registry,
            Err(err) => {
                tracing::warn!(
                    repo = %repository.name,
                    error = %err,
                    "skipping repository during global lookup",
                );
                continue;
            }
        };
        if let Some(workspace) = registry.find(name) {
            return Ok((repository.clone(), workspace.clone()));
        }
    }
    Err(CoreError::NotFoundAnywhere {
        name: name.to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
