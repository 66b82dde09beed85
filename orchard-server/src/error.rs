use thiserror::Error;

/// Failures of the server loop itself. Request-level failures are reported
/// to the client as error responses and never surface here.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error on {stream}: {source}")]
    Io {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request worker failed: {0}")]
    Join(String),
}

pub(crate) fn io_err(stream: &'static str, source: std::io::Error) -> ServerError {
    ServerError::Io { stream, source }
}
