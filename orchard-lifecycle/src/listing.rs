//! Listing and port reports across repositories.

use serde::Serialize;

use orchard_core::{RepoName, Repository, Workspace, WorkspaceName};

use crate::context::{Lifecycle, RepoContext};
use crate::error::LifecycleError;

/// Workspaces of one registered repository. `error` is set when the
/// repository could not be read; `workspaces` is then empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoListing {
    pub repo: Repository,
    pub workspaces: Vec<Workspace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One reserved port block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortBlock {
    pub repo: RepoName,
    pub workspace: WorkspaceName,
    pub start: u16,
    pub end: u16,
}

impl Lifecycle {
    /// Reconciled workspaces of `ctx`.
    pub fn list(&self, ctx: &RepoContext) -> Result<Vec<Workspace>, LifecycleError> {
        Ok(self.load_workspaces(ctx)?.workspaces)
    }

    /// Reconciled workspaces of every registered repository, in
    /// registration order.
    pub fn list_all(&self) -> Result<Vec<RepoListing>, LifecycleError> {
        let repos = self.load_repos()?;
        Ok(repos
            .repositories
            .into_iter()
            .map(|repo| {
                match self
                    .open_registered(&repo)
                    .and_then(|ctx| self.load_workspaces(&ctx))
                {
                    Ok(registry) => RepoListing {
                        repo,
                        workspaces: registry.workspaces,
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(repo = %repo.name, error = %err, "cannot list repository");
                        RepoListing {
                            repo,
                            workspaces: Vec::new(),
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect())
    }

    /// Every allocated block across registered repositories, by port.
    pub fn port_blocks(&self) -> Result<Vec<PortBlock>, LifecycleError> {
        let mut blocks = Vec::new();
        for repo in self.load_repos()?.repositories {
            let loaded = self
                .open_registered(&repo)
                .and_then(|ctx| Ok((self.load_workspaces(&ctx)?, ctx)));
            let (registry, ctx) = match loaded {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(repo = %repo.name, error = %err, "port report skipped repository");
                    continue;
                }
            };
            let size = ctx.config.port_block_size;
            blocks.extend(registry.workspaces.into_iter().map(|ws| PortBlock {
                repo: ctx.name.clone(),
                workspace: ws.name,
                start: ws.port,
                end: ws.port.saturating_add(size.saturating_sub(1)),
            }));
        }
        blocks.sort_by_key(|b| b.start);
        Ok(blocks)
    }
}
