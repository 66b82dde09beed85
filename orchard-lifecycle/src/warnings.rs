//! Collector for advisory-step failures.
//!
//! Advisory steps (fetch, auto-registration, file sync, scripts, session
//! stop/rename, branch cleanup) never abort an operation. Their failures are
//! logged at `warn` and returned to the caller in the outcome.

use std::fmt::Display;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Warnings(Vec<String>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed advisory step.
    pub fn push(&mut self, step: &str, err: impl Display) {
        tracing::warn!(step, error = %err, "advisory step failed");
        self.0.push(format!("{step}: {err}"));
    }

    /// Unwrap an advisory result, recording the failure.
    pub fn check<T, E: Display>(&mut self, step: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(step, err);
                None
            }
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
