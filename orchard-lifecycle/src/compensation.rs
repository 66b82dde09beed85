//! Ordered undo stack for multi-step operations.
//!
//! Each external step that succeeds pushes the action that reverses it. If a
//! later step fails the stack is unwound in reverse order; undo failures are
//! logged and collected, never raised in place of the original error. A
//! completed operation calls [`Compensations::commit`] to discard the stack.

use orchard_core::ExternalError;

type Undo<'a> = Box<dyn FnOnce() -> Result<(), ExternalError> + 'a>;

#[derive(Default)]
pub struct Compensations<'a> {
    steps: Vec<(String, Undo<'a>)>,
}

impl<'a> Compensations<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(
        &mut self,
        label: impl Into<String>,
        undo: impl FnOnce() -> Result<(), ExternalError> + 'a,
    ) {
        self.steps.push((label.into(), Box::new(undo)));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every undo step, newest first. Returns the failures.
    pub fn unwind(self) -> Vec<String> {
        let mut failures = Vec::new();
        for (label, undo) in self.steps.into_iter().rev() {
            match undo() {
                Ok(()) => tracing::info!(step = %label, "compensated"),
                Err(err) => {
                    tracing::error!(step = %label, error = %err, "compensation failed");
                    failures.push(format!("{label}: {err}"));
                }
            }
        }
        failures
    }

    pub fn commit(self) {
        drop(self.steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn unwinds_in_reverse_and_collects_failures() {
        let log = RefCell::new(Vec::new());
        let mut comp = Compensations::new();
        comp.push("first", || {
            log.borrow_mut().push("first");
            Ok(())
        });
        comp.push("second", || {
            log.borrow_mut().push("second");
            Err(ExternalError::new("git", "worktree remove", "locked"))
        });
        comp.push("third", || {
            log.borrow_mut().push("third");
            Ok(())
        });
        assert_eq!(comp.len(), 3);

        let failures = comp.unwind();
        assert_eq!(*log.borrow(), vec!["third", "second", "first"]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("second: git worktree remove failed"));
    }

    #[test]
    fn commit_runs_nothing() {
        let ran = RefCell::new(false);
        let mut comp = Compensations::new();
        comp.push("undo", || {
            *ran.borrow_mut() = true;
            Ok(())
        });
        comp.commit();
        assert!(!*ran.borrow());
    }
}
