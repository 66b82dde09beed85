//! Workspace archival.
//!
//! The registry entry is removed even when the worktree cannot be removed,
//! so a manual cleanup never leaves a phantom entry behind.

use serde::Serialize;

use orchard_core::{CoreError, Workspace};

use crate::context::{Lifecycle, RepoContext};
use crate::env::{session_key, workspace_env};
use crate::error::LifecycleError;
use crate::warnings::Warnings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Archive even with uncommitted changes; also force-deletes the branch.
    pub force: bool,
    /// Treat a missing workspace as already archived.
    pub missing_ok: bool,
    /// Delete the workspace branch once merged into the default branch.
    pub delete_branch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    Archived {
        workspace: Workspace,
        branch_deleted: bool,
        warnings: Vec<String>,
    },
    /// The workspace did not exist; nothing was changed.
    NotFound { name: String },
}

impl Lifecycle {
    pub fn archive(
        &self,
        ctx: &RepoContext,
        name: &str,
        options: ArchiveOptions,
    ) -> Result<ArchiveOutcome, LifecycleError> {
        let vcs = self.tools.vcs.as_ref();
        let mut warnings = Warnings::new();
        let mut registry = self.load_workspaces(ctx)?;
        let Some(ws) = registry.find(name).cloned() else {
            if options.missing_ok {
                tracing::info!(workspace = name, "workspace not found; treating as archived");
                return Ok(ArchiveOutcome::NotFound {
                    name: name.to_owned(),
                });
            }
            return Err(CoreError::WorkspaceNotFound {
                name: name.to_owned(),
            }
            .into());
        };

        if !options.force && vcs.is_dirty(&ws.path)? {
            return Err(LifecycleError::DirtyWorkspace {
                name: name.to_owned(),
            });
        }

        let key = session_key(ctx.name.as_str(), name);
        if self.session_running(&key) {
            warnings.check("stop session", self.tools.sessions.stop(&key));
        }

        if let Some(script) = &ctx.config.scripts.archive {
            let env = workspace_env(ctx, &ws);
            warnings.check("archive script", self.tools.scripts.run(script, &ws.path, &env));
        }

        warnings.check(
            "remove worktree",
            vcs.remove_worktree(&ctx.root, &ws.path, options.force),
        );

        registry.remove(name)?;
        registry.save_at(&ctx.registry_path())?;
        tracing::info!(workspace = name, port = ws.port, "workspace archived");

        let branch_deleted = options.delete_branch
            && self.delete_branch(ctx, &ws.branch, options.force, &mut warnings);

        Ok(ArchiveOutcome::Archived {
            workspace: ws,
            branch_deleted,
            warnings: warnings.into_vec(),
        })
    }

    /// Delete `branch` if it is merged into the default branch, or
    /// unconditionally with `force`.
    fn delete_branch(
        &self,
        ctx: &RepoContext,
        branch: &str,
        force: bool,
        warnings: &mut Warnings,
    ) -> bool {
        let vcs = self.tools.vcs.as_ref();
        if !force {
            let Some(default) = warnings.check("default branch", vcs.default_branch(&ctx.root))
            else {
                return false;
            };
            match vcs.is_merged(&ctx.root, branch, &default) {
                Ok(true) => {}
                Ok(false) => {
                    warnings.push(
                        "delete branch",
                        format!("'{branch}' is not merged into '{default}'; kept"),
                    );
                    return false;
                }
                Err(err) => {
                    warnings.push("delete branch", err);
                    return false;
                }
            }
        }
        warnings
            .check("delete branch", vcs.delete_branch(&ctx.root, branch, force))
            .is_some()
    }
}
