//! Workspace creation.
//!
//! ## Step order
//!
//! 1. Pick and validate the name (generated when absent).
//! 2. Fetch `origin` (advisory).
//! 3. Allocate a port block against the global exclusion set.
//! 4. Add the worktree. Undo: remove it, delete a newly created branch.
//! 5. Append to the registry and save. On failure the undo stack unwinds.
//! 6. Auto-register the repository (advisory, silent).
//! 7. Copy include-listed files, run the setup script (advisory).

use chrono::Utc;
use serde::Serialize;

use orchard_core::external::AddWorktree;
use orchard_core::repos::AutoRegistration;
use orchard_core::{names, ports, CoreError, RepoName, RepoRegistry, Repository, Workspace, WorkspaceName};

use crate::compensation::Compensations;
use crate::context::{Lifecycle, RepoContext};
use crate::env::workspace_env;
use crate::error::LifecycleError;
use crate::warnings::Warnings;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    /// Workspace name; generated when `None`.
    pub name: Option<String>,
    /// Branch to check out or create; defaults to the workspace name.
    pub branch: Option<String>,
    /// Start point for a new branch; defaults to the default branch.
    pub base: Option<String>,
    /// Return an existing workspace of the same name instead of failing.
    pub existing_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOutcome {
    pub repo: RepoName,
    pub workspace: Workspace,
    /// `false` when an existing workspace was returned.
    pub created: bool,
    pub warnings: Vec<String>,
}

impl Lifecycle {
    pub fn create(
        &self,
        ctx: &RepoContext,
        request: &CreateRequest,
    ) -> Result<CreateOutcome, LifecycleError> {
        let vcs = self.tools.vcs.as_ref();
        let mut warnings = Warnings::new();
        let mut registry = self.load_workspaces(ctx)?;
        let base_dir = ctx.worktree_base(self.home());

        // 1. Name
        let name = match &request.name {
            Some(raw) => {
                let name = WorkspaceName::parse(raw)?;
                if let Some(existing) = registry.find(name.as_str()) {
                    if request.existing_ok {
                        tracing::info!(workspace = %name, "workspace already exists");
                        return Ok(CreateOutcome {
                            repo: ctx.name.clone(),
                            workspace: existing.clone(),
                            created: false,
                            warnings: Vec::new(),
                        });
                    }
                    return Err(CoreError::WorkspaceExists { name: name.0 }.into());
                }
                name
            }
            None => WorkspaceName::from(names::generate_unique(|candidate| {
                registry.contains(candidate) || base_dir.join(candidate).exists()
            })),
        };
        let path = base_dir.join(name.as_str());
        if path.exists() {
            return Err(CoreError::PathOccupied { path }.into());
        }

        // 2. Fetch
        let fetched = warnings.check("fetch", vcs.fetch(&ctx.root)).is_some();

        // 3. Port block
        let excluded = self.global_ports(ctx, &registry);
        let port = ports::allocate(
            &excluded,
            ctx.config.base_port,
            ctx.config.port_block_size,
            self.tools.probe.as_ref(),
        )?;

        // 4. Worktree
        let branch = request.branch.clone().unwrap_or_else(|| name.0.clone());
        let branch_exists = vcs.branch_exists(&ctx.root, &branch)?;
        let start_point = if branch_exists {
            None
        } else {
            self.start_point(ctx, request.base.as_deref(), fetched, &mut warnings)
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| orchard_core::error::io_err(parent, e))?;
        }
        vcs.add_worktree(
            &ctx.root,
            &AddWorktree {
                path: path.clone(),
                branch: branch.clone(),
                create_branch: !branch_exists,
                start_point,
            },
        )?;

        let mut undo = Compensations::new();
        if !branch_exists {
            let (root, branch) = (ctx.root.clone(), branch.clone());
            undo.push(format!("delete branch {branch}"), move || {
                vcs.delete_branch(&root, &branch, true)
            });
        }
        let (root, wt) = (ctx.root.clone(), path.clone());
        undo.push(format!("remove worktree {}", path.display()), move || {
            vcs.remove_worktree(&root, &wt, true)
        });

        // 5. Registry
        let workspace = Workspace {
            name: name.clone(),
            path: path.clone(),
            branch,
            port,
            created_at: Utc::now(),
        };
        let committed = registry
            .add(workspace.clone())
            .and_then(|()| registry.save_at(&ctx.registry_path()));
        if let Err(err) = committed {
            tracing::error!(workspace = %name, error = %err, "registry update failed; rolling back");
            return Err(LifecycleError::rolled_back(err, undo.unwind()));
        }
        undo.commit();
        tracing::info!(workspace = %name, port, path = %path.display(), "workspace created");

        // 6. Auto-registration
        self.auto_register(ctx, &mut warnings);

        // 7. Files and setup
        let env = workspace_env(ctx, &workspace);
        if !ctx.config.copy.is_empty() {
            if let Some(count) = warnings.check(
                "copy files",
                self.tools.files.sync(&ctx.root, &path, &ctx.config.copy),
            ) {
                tracing::debug!(workspace = %name, count, "copied files");
            }
        }
        if let Some(script) = &ctx.config.scripts.setup {
            warnings.check("setup script", self.tools.scripts.run(script, &path, &env));
        }

        Ok(CreateOutcome {
            repo: ctx.name.clone(),
            workspace,
            created: true,
            warnings: warnings.into_vec(),
        })
    }

    fn start_point(
        &self,
        ctx: &RepoContext,
        base: Option<&str>,
        fetched: bool,
        warnings: &mut Warnings,
    ) -> Option<String> {
        if let Some(base) = base {
            return Some(base.to_owned());
        }
        let default = warnings.check("default branch", self.tools.vcs.default_branch(&ctx.root))?;
        Some(if fetched {
            format!("origin/{default}")
        } else {
            default
        })
    }

    /// Record the repository in the global registry. Never fails the caller;
    /// a name taken by another path is skipped.
    fn auto_register(&self, ctx: &RepoContext, warnings: &mut Warnings) {
        let Some(mut repos) = warnings.check("load repositories", RepoRegistry::load_at(self.home()))
        else {
            return;
        };
        let repo = Repository {
            name: ctx.name.clone(),
            path: ctx.root.clone(),
        };
        match repos.auto_register(repo) {
            AutoRegistration::Registered(repo) => {
                if warnings
                    .check("register repository", repos.save_at(self.home()))
                    .is_some()
                {
                    tracing::info!(repo = %repo.name, "registered repository");
                }
            }
            AutoRegistration::AlreadyRegistered(_) => {}
            AutoRegistration::NameTaken(name) => tracing::info!(
                repo = %name,
                path = %ctx.root.display(),
                "repository name taken by another path; not registered",
            ),
        }
    }
}
