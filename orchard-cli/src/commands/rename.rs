//! `orchard rename OLD NEW`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::context::{cwd, lifecycle};
use crate::output::print_warnings;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Current workspace name.
    pub old: String,

    /// New workspace name; also the new worktree directory name.
    pub new: String,

    /// Look the workspace up in this registered repository.
    #[arg(long)]
    pub repo: Option<String>,
}

impl RenameArgs {
    pub fn run(self) -> Result<()> {
        let lifecycle = lifecycle()?;
        let resolved = lifecycle.resolve(&cwd()?, Some(&self.old), self.repo.as_deref())?;
        let outcome = lifecycle.rename(&resolved.ctx, &self.old, &self.new)?;

        print_warnings(&outcome.warnings);
        println!(
            "{} Renamed '{}' to '{}'",
            "✓".green(),
            outcome.previous,
            outcome.workspace.name.as_str().bold(),
        );
        println!("  path: {}", outcome.workspace.path.display());
        Ok(())
    }
}
