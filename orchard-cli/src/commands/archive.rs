//! `orchard archive [NAME]`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use orchard_lifecycle::{ArchiveOptions, ArchiveOutcome};

use crate::context::{cwd, lifecycle};
use crate::output::print_warnings;

/// Arguments for `orchard archive`.
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Workspace name. Defaults to the workspace containing the current
    /// directory.
    pub name: Option<String>,

    /// Look the workspace up in this registered repository.
    #[arg(long)]
    pub repo: Option<String>,

    /// Archive despite uncommitted changes; force-delete the branch.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Succeed when the workspace does not exist.
    #[arg(long)]
    pub missing_ok: bool,

    /// Delete the workspace branch if it is merged into the default branch.
    #[arg(long)]
    pub delete_branch: bool,
}

impl ArchiveArgs {
    pub fn run(self) -> Result<()> {
        let lifecycle = lifecycle()?;
        let resolved =
            match lifecycle.resolve(&cwd()?, self.name.as_deref(), self.repo.as_deref()) {
                Ok(resolved) => resolved,
                Err(err) if self.missing_ok && err.is_missing_workspace() => {
                    println!("Nothing to archive: {err}");
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

        let outcome = lifecycle.archive(
            &resolved.ctx,
            resolved.workspace.name.as_str(),
            ArchiveOptions {
                force: self.force,
                missing_ok: self.missing_ok,
                delete_branch: self.delete_branch,
            },
        )?;

        match outcome {
            ArchiveOutcome::Archived {
                workspace,
                branch_deleted,
                warnings,
            } => {
                print_warnings(&warnings);
                println!(
                    "{} Archived workspace '{}' (port {} released)",
                    "✓".green(),
                    workspace.name.as_str().bold(),
                    workspace.port,
                );
                if branch_deleted {
                    println!("  deleted branch '{}'", workspace.branch);
                }
            }
            ArchiveOutcome::NotFound { name } => {
                println!("Nothing to archive: workspace '{name}' not found");
            }
        }
        Ok(())
    }
}
