//! Workspace rename.
//!
//! The worktree is moved before the registry is touched: a failed move
//! leaves the registry exactly as it was. If saving the registry then fails,
//! the move is reversed.

use serde::Serialize;

use orchard_core::{CoreError, Workspace, WorkspaceName};

use crate::compensation::Compensations;
use crate::context::{Lifecycle, RepoContext};
use crate::env::session_key;
use crate::error::LifecycleError;
use crate::warnings::Warnings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub previous: WorkspaceName,
    pub workspace: Workspace,
    pub warnings: Vec<String>,
}

impl Lifecycle {
    pub fn rename(
        &self,
        ctx: &RepoContext,
        old: &str,
        new: &str,
    ) -> Result<RenameOutcome, LifecycleError> {
        let vcs = self.tools.vcs.as_ref();
        let new = WorkspaceName::parse(new)?;
        let mut warnings = Warnings::new();
        let mut registry = self.load_workspaces(ctx)?;

        let ws = registry
            .find(old)
            .cloned()
            .ok_or_else(|| CoreError::WorkspaceNotFound {
                name: old.to_owned(),
            })?;
        if old == new.as_str() {
            return Err(CoreError::SameName {
                name: old.to_owned(),
            }
            .into());
        }
        if registry.contains(new.as_str()) {
            return Err(CoreError::WorkspaceExists { name: new.0 }.into());
        }
        let new_path = ws.path.with_file_name(new.as_str());
        if new_path.exists() {
            return Err(CoreError::PathOccupied { path: new_path }.into());
        }

        vcs.move_worktree(&ctx.root, &ws.path, &new_path)?;
        let mut undo = Compensations::new();
        let (root, from, to) = (ctx.root.clone(), ws.path.clone(), new_path.clone());
        undo.push(format!("move worktree back to {}", ws.path.display()), move || {
            vcs.move_worktree(&root, &to, &from)
        });

        let committed = registry
            .rename(old, &new, new_path)
            .cloned()
            .and_then(|renamed| registry.save_at(&ctx.registry_path()).map(|()| renamed));
        let renamed = match committed {
            Ok(renamed) => renamed,
            Err(err) => {
                tracing::error!(workspace = old, error = %err, "registry update failed; rolling back");
                return Err(LifecycleError::rolled_back(err, undo.unwind()));
            }
        };
        undo.commit();
        tracing::info!(from = old, to = %new, "workspace renamed");

        let old_key = session_key(ctx.name.as_str(), old);
        if self.session_running(&old_key) {
            let new_key = session_key(ctx.name.as_str(), new.as_str());
            warnings.check("rename session", self.tools.sessions.rename(&old_key, &new_key));
        }

        Ok(RenameOutcome {
            previous: ws.name,
            workspace: renamed,
            warnings: warnings.into_vec(),
        })
    }
}
