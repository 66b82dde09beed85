//! Port block allocator.
//!
//! Candidate block starts are `base + i * block_size` for `i = 0, 1, …`. A
//! candidate is skipped when an already-allocated block start falls inside
//! it or when it would run past port 65535; otherwise every port of the block
//! is probed and the first fully free block wins.
//!
//! Allocation predicts availability, it does not reserve anything at the OS
//! level. Between the probe and the eventual bind by the workspace's own
//! processes another program may take a port; a probe that times out is
//! counted as free and may be a false negative.
//!
//! The exclusion set must be the union of allocated starts across *all*
//! registered repositories, or two repositories will hand out the same block.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::CoreError;

pub const MAX_PORT: u32 = u16::MAX as u32;

/// Upper bound on candidate blocks examined per allocation.
pub const MAX_ATTEMPTS: usize = 100;

pub const PROBE_TIMEOUT: Duration = Duration::from_millis(150);

/// Liveness check for a single port.
pub trait PortProbe: Send + Sync {
    fn is_free(&self, port: u16) -> bool;
}

/// Probes by connecting to `127.0.0.1:<port>`; a refused connection is free.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    pub timeout: Duration,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl PortProbe for TcpProbe {
    fn is_free(&self, port: u16) -> bool {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        match TcpStream::connect_timeout(&addr, self.timeout) {
            Ok(_) => false,
            Err(err) if err.kind() == ErrorKind::TimedOut => {
                tracing::debug!(port, "port probe timed out; treating as free");
                true
            }
            Err(_) => true,
        }
    }
}

/// Find the first free, non-excluded block of `block_size` ports at or after
/// `base_port`.
pub fn allocate(
    excluded: &BTreeSet<u16>,
    base_port: u16,
    block_size: u16,
    probe: &dyn PortProbe,
) -> Result<u16, CoreError> {
    allocate_with_attempts(excluded, base_port, block_size, probe, MAX_ATTEMPTS)
}

pub fn allocate_with_attempts(
    excluded: &BTreeSet<u16>,
    base_port: u16,
    block_size: u16,
    probe: &dyn PortProbe,
    max_attempts: usize,
) -> Result<u16, CoreError> {
    let exhausted = |attempts| CoreError::ExhaustedPortSpace {
        base_port,
        block_size,
        attempts,
    };
    if block_size == 0 {
        return Err(exhausted(0));
    }

    let block = u32::from(block_size);
    for attempt in 0..max_attempts {
        let start = u32::from(base_port) + attempt as u32 * block;
        let end = start + block - 1;
        if end > MAX_PORT {
            // Every later candidate is further out of range.
            return Err(exhausted(attempt + 1));
        }
        if excluded.range(start as u16..=end as u16).next().is_some() {
            continue;
        }
        if (start..=end).all(|port| probe.is_free(port as u16)) {
            tracing::debug!(port = start, block_size, "allocated port block");
            return Ok(start as u16);
        }
        tracing::debug!(port = start, "port block in use; trying next");
    }
    Err(exhausted(max_attempts))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
