//! Error types for orchard-lifecycle.

use thiserror::Error;

use orchard_core::{CoreError, ErrorKind, ExternalError};

/// All errors that can arise from lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A required external step (worktree add/move, session start) failed.
    #[error(transparent)]
    External(#[from] ExternalError),

    #[error("workspace '{name}' has uncommitted changes; pass --force to archive anyway")]
    DirtyWorkspace { name: String },

    #[error("repository '{repo}' has no run script (scripts.run in .orchard.yaml)")]
    NoRunScript { repo: String },

    #[error("session '{session}' is already running")]
    SessionRunning { session: String },

    #[error("session '{session}' is not running")]
    SessionNotRunning { session: String },

    /// A step failed after earlier steps had changed external state; those
    /// steps were undone. `compensation_failures` lists undo steps that
    /// themselves failed.
    #[error("{source}{}", rollback_note(.compensation_failures))]
    RolledBack {
        source: Box<LifecycleError>,
        compensation_failures: Vec<String>,
    },
}

fn rollback_note(failures: &[String]) -> String {
    if failures.is_empty() {
        " (rolled back)".to_owned()
    } else {
        format!(" (rollback incomplete: {})", failures.join("; "))
    }
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Core(err) => err.kind(),
            LifecycleError::External(_) => ErrorKind::ExternalOperationFailed,
            LifecycleError::DirtyWorkspace { .. } => ErrorKind::DirtyWorkspace,
            LifecycleError::NoRunScript { .. } => ErrorKind::InvalidInput,
            LifecycleError::SessionRunning { .. } => ErrorKind::AlreadyExists,
            LifecycleError::SessionNotRunning { .. } => ErrorKind::NotFound,
            LifecycleError::RolledBack { source, .. } => source.kind(),
        }
    }

    /// A workspace lookup miss, locally or across repositories. An unknown
    /// repository is not a miss.
    pub fn is_missing_workspace(&self) -> bool {
        matches!(
            self,
            LifecycleError::Core(
                CoreError::WorkspaceNotFound { .. } | CoreError::NotFoundAnywhere { .. }
            )
        )
    }

    pub(crate) fn rolled_back(source: impl Into<LifecycleError>, failures: Vec<String>) -> Self {
        LifecycleError::RolledBack {
            source: Box::new(source.into()),
            compensation_failures: failures,
        }
    }
}
