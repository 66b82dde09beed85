//! Agent-protocol adapter for Orchard.
//!
//! Reads one JSON request per line, runs the matching lifecycle operation
//! and writes one JSON response per line. See [`protocol`] for the format.

mod error;
pub mod handler;
pub mod protocol;
mod runtime;

pub use error::ServerError;
pub use handler::dispatch;
pub use protocol::{ErrorBody, Request, Response};
pub use runtime::{serve, start_blocking};
