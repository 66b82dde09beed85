//! Error types for orchard-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::external::ExternalError;

/// Stable, machine-readable classification of every failure the core can
/// surface. Structured callers (JSON output, the agent server) report the
/// [`ErrorKind::as_str`] key and [`ErrorKind::exit_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    CorruptDocument,
    ExhaustedPortSpace,
    NotInWorkspace,
    NotFoundAnywhere,
    DirtyWorkspace,
    ExternalOperationFailed,
    InvalidInput,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::CorruptDocument => "corrupt_document",
            ErrorKind::ExhaustedPortSpace => "exhausted_port_space",
            ErrorKind::NotInWorkspace => "not_in_workspace",
            ErrorKind::NotFoundAnywhere => "not_found_anywhere",
            ErrorKind::DirtyWorkspace => "dirty_workspace",
            ErrorKind::ExternalOperationFailed => "external_operation_failed",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Io => "io",
        }
    }

    /// Process exit code. `0` is success, `1` a generic failure and `2` is
    /// reserved for clap usage errors.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Io => 1,
            ErrorKind::InvalidInput => 3,
            ErrorKind::NotFound => 10,
            ErrorKind::NotFoundAnywhere => 11,
            ErrorKind::NotInWorkspace => 12,
            ErrorKind::AlreadyExists => 13,
            ErrorKind::DirtyWorkspace => 14,
            ErrorKind::ExhaustedPortSpace => 15,
            ErrorKind::CorruptDocument => 16,
            ErrorKind::ExternalOperationFailed => 17,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All errors that can arise from core registry, store and allocation work.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted document exists but its bytes do not parse.
    #[error("corrupt document at {path}: {source}")]
    CorruptDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (save path).
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The cooperative lock on a document could not be taken.
    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.orchard/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The repository config file exists but is malformed or out of range.
    #[error("invalid config at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("workspace '{name}' already exists")]
    WorkspaceExists { name: String },

    #[error("workspace '{name}' not found")]
    WorkspaceNotFound { name: String },

    #[error("workspace '{name}' is already named '{name}'")]
    SameName { name: String },

    #[error("path {path} is already in use")]
    PathOccupied { path: PathBuf },

    #[error("repository name '{name}' is already registered")]
    RepoNameTaken { name: String },

    #[error("repository at {path} is already registered as '{name}'")]
    RepoPathTaken { path: PathBuf, name: String },

    #[error("repository '{name}' is not registered")]
    RepoNotFound { name: String },

    #[error("{dir} is not inside any workspace")]
    NotInWorkspace { dir: PathBuf },

    #[error("workspace '{name}' not found in any registered repository")]
    NotFoundAnywhere { name: String },

    #[error(
        "no free port block of size {block_size} from base {base_port} after {attempts} attempts"
    )]
    ExhaustedPortSpace {
        base_port: u16,
        block_size: u16,
        attempts: usize,
    },

    #[error(transparent)]
    External(#[from] ExternalError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Io { .. } | CoreError::Lock { .. } | CoreError::HomeNotFound => {
                ErrorKind::Io
            }
            CoreError::CorruptDocument { .. } => ErrorKind::CorruptDocument,
            CoreError::Serialize(_) => ErrorKind::Io,
            CoreError::InvalidConfig { .. }
            | CoreError::InvalidName { .. }
            | CoreError::SameName { .. } => ErrorKind::InvalidInput,
            CoreError::WorkspaceExists { .. }
            | CoreError::PathOccupied { .. }
            | CoreError::RepoNameTaken { .. }
            | CoreError::RepoPathTaken { .. } => ErrorKind::AlreadyExists,
            CoreError::WorkspaceNotFound { .. } | CoreError::RepoNotFound { .. } => {
                ErrorKind::NotFound
            }
            CoreError::NotInWorkspace { .. } => ErrorKind::NotInWorkspace,
            CoreError::NotFoundAnywhere { .. } => ErrorKind::NotFoundAnywhere,
            CoreError::ExhaustedPortSpace { .. } => ErrorKind::ExhaustedPortSpace,
            CoreError::External(_) => ErrorKind::ExternalOperationFailed,
        }
    }
}

/// Convenience constructor for [`CoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
