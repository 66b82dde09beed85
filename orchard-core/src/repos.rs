//! Global repository registry (`~/.orchard/repos.json`).
//!
//! The join point for cross-repository work: global listing, the global port
//! survey and global workspace lookup all iterate this list in registration
//! order instead of scanning the filesystem.
//!
//! # API pattern
//!
//! Functions touching the real home directory come in two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::paths::{home, repos_path, same_path};
use crate::store;
use crate::types::{RepoName, Repository};

pub const SCHEMA_VERSION: u32 = 1;

/// Ordered collection of registered repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRegistry {
    pub version: u32,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

impl Default for RepoRegistry {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            repositories: Vec::new(),
        }
    }
}

/// Outcome of [`RepoRegistry::auto_register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoRegistration {
    Registered(Repository),
    /// The path is already known (under any name).
    AlreadyRegistered(RepoName),
    /// Another repository already uses the chosen name; nothing was recorded.
    NameTaken(RepoName),
}

impl RepoRegistry {
    // -- persistence --------------------------------------------------------

    pub fn load_at(home: &Path) -> Result<Self, CoreError> {
        store::load(&repos_path(home))
    }

    pub fn load() -> Result<Self, CoreError> {
        Self::load_at(&home()?)
    }

    pub fn save_at(&self, home: &Path) -> Result<(), CoreError> {
        store::save(&repos_path(home), self)
    }

    pub fn save(&self) -> Result<(), CoreError> {
        self.save_at(&home()?)
    }

    // -- queries ------------------------------------------------------------

    pub fn find(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name.0 == name)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<&Repository> {
        self.repositories
            .iter()
            .find(|repo| same_path(&repo.path, path))
    }

    pub fn names(&self) -> Vec<RepoName> {
        self.repositories.iter().map(|r| r.name.clone()).collect()
    }

    // -- mutations ----------------------------------------------------------

    /// Register `repo`. A path collision and a name collision are distinct
    /// errors; the path is checked first.
    pub fn add(&mut self, repo: Repository) -> Result<(), CoreError> {
        if let Some(existing) = self.find_by_path(&repo.path) {
            return Err(CoreError::RepoPathTaken {
                path: repo.path,
                name: existing.name.0.clone(),
            });
        }
        if self.find(&repo.name.0).is_some() {
            return Err(CoreError::RepoNameTaken { name: repo.name.0 });
        }
        self.repositories.push(repo);
        Ok(())
    }

    /// Forget a repository. Workspaces and version-control data are untouched.
    pub fn remove(&mut self, name: &str) -> Result<Repository, CoreError> {
        let index = self
            .repositories
            .iter()
            .position(|r| r.name.0 == name)
            .ok_or_else(|| CoreError::RepoNotFound {
                name: name.to_owned(),
            })?;
        Ok(self.repositories.remove(index))
    }

    /// Idempotent, infallible registration used by workspace creation.
    pub fn auto_register(&mut self, repo: Repository) -> AutoRegistration {
        match self.add(repo.clone()) {
            Ok(()) => AutoRegistration::Registered(repo),
            Err(CoreError::RepoPathTaken { name, .. }) => {
                AutoRegistration::AlreadyRegistered(RepoName(name))
            }
            Err(_) => AutoRegistration::NameTaken(repo.name),
        }
    }
}

/// Default registry name for a repository root: its directory base name.
pub fn default_repo_name(root: &Path) -> RepoName {
    RepoName::from(
        root.file_name()
            .unwrap_or_else(|| root.as_os_str())
            .to_string_lossy()
            .into_owned(),
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
