//! Wire format of the agent server: one JSON object per line in each
//! direction.
//!
//! ```text
//! → {"id":1,"cmd":"create","repo":"api","name":"fix-login"}
//! ← {"id":1,"ok":true,"data":{...}}
//! ← {"id":2,"ok":false,"error":{"kind":"not_found","code":10,"message":"..."}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use orchard_core::{CoreError, ErrorKind};
use orchard_lifecycle::LifecycleError;

/// JSON newline-delimited request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    /// Echoed back verbatim so clients can pair responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub existing_ok: bool,
    pub force: bool,
    pub missing_ok: bool,
    pub delete_branch: bool,
}

/// JSON newline-delimited response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn ok(id: Option<Value>, data: Value) -> Self {
        Self {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: ErrorBody) -> Self {
        Self {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Machine-readable failure: the stable kind key, its exit code and the
/// human message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub code: i32,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: kind.as_str().to_owned(),
            code: kind.exit_code(),
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }
}

impl From<LifecycleError> for ErrorBody {
    fn from(err: LifecycleError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<CoreError> for ErrorBody {
    fn from(err: CoreError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<serde_json::Error> for ErrorBody {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Io, format!("cannot encode response: {err}"))
    }
}
