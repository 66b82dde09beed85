//! orchard-core: shared types, persistence and pure logic for Orchard.
//!
//! Orchard manages ephemeral workspaces: isolated git worktrees, each with a
//! branch and a reserved block of TCP ports. This crate holds everything
//! that does not shell out:
//!
//! - [`store`]: locked, atomically replaced JSON documents
//! - [`workspaces`] / [`repos`]: the per-repository and global registries
//! - [`ports`]: the port block allocator
//! - [`resolver`]: local and global workspace lookup
//! - [`config`]: `.orchard.yaml`
//! - [`external`]: traits for the git, session, script and file-sync
//!   collaborators implemented in `orchard-shell`

pub mod config;
pub mod error;
pub mod external;
pub mod names;
pub mod paths;
pub mod ports;
pub mod repos;
pub mod resolver;
pub mod store;
pub mod types;
pub mod workspaces;

pub use config::Config;
pub use error::{CoreError, ErrorKind};
pub use external::{Env, ExternalError};
pub use repos::RepoRegistry;
pub use types::{RepoName, Repository, Workspace, WorkspaceName};
pub use workspaces::WorkspaceRegistry;
