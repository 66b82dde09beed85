//! Domain types for the Orchard registries.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Persisted field names are camelCase (`createdAt`).

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Longest accepted workspace or repository name.
pub const MAX_NAME_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed workspace name, unique within one repository's registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceName(pub String);

impl WorkspaceName {
    /// Parse a user-supplied name, rejecting anything unsafe as a directory,
    /// branch or session name.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        validate_name(raw)?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WorkspaceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkspaceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed repository name, unique within the global registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(pub String);

impl RepoName {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        validate_name(raw)?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

fn validate_name(raw: &str) -> Result<(), CoreError> {
    let invalid = |reason| CoreError::InvalidName {
        name: raw.to_owned(),
        reason,
    };
    if raw.is_empty() {
        return Err(invalid("name is empty"));
    }
    if raw.len() > MAX_NAME_LEN {
        return Err(invalid("name is longer than 64 characters"));
    }
    if !raw.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(invalid("name must start with a letter or digit"));
    }
    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("only letters, digits, '-', '_' and '.' are allowed"));
    }
    if raw.ends_with(".lock") || raw.contains("..") {
        return Err(invalid("name is not a valid git branch component"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One isolated worktree with its reserved port block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub name: WorkspaceName,
    /// Absolute path to the worktree root.
    pub path: PathBuf,
    pub branch: String,
    /// First port of the reserved contiguous block.
    pub port: u16,
    pub created_at: DateTime<Utc>,
}

/// A registered source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: RepoName,
    /// Absolute path to the primary (root) worktree.
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
