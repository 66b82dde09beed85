//! # orchard-lifecycle
//!
//! Workspace lifecycle orchestration on top of `orchard-core`.
//!
//! Build a [`Lifecycle`] from a home directory and a set of
//! [`Collaborators`], open a [`RepoContext`] and call [`Lifecycle::create`],
//! [`Lifecycle::archive`] or [`Lifecycle::rename`]. Multi-step operations
//! undo completed external steps through [`compensation::Compensations`]
//! when a later required step fails.

pub mod archive;
pub mod compensation;
pub mod context;
pub mod create;
pub mod env;
pub mod error;
pub mod listing;
pub mod rename;
pub mod resolve;
pub mod session;
pub mod warnings;

pub use archive::{ArchiveOptions, ArchiveOutcome};
pub use context::{Collaborators, Lifecycle, RepoContext};
pub use create::{CreateOutcome, CreateRequest};
pub use error::LifecycleError;
pub use listing::{PortBlock, RepoListing};
pub use rename::RenameOutcome;
pub use resolve::Resolved;
pub use session::{RunOutcome, DEFAULT_LOG_LINES};
