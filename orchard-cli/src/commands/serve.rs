//! `orchard serve`: agent-protocol server on stdin/stdout.

use anyhow::{Context, Result};

use crate::context::lifecycle;

pub fn run() -> Result<()> {
    orchard_server::start_blocking(lifecycle()?).context("agent server failed")
}
