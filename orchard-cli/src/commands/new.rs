//! `orchard new [NAME]`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use orchard_lifecycle::CreateRequest;

use crate::context::{cwd, lifecycle};
use crate::output::{port_range, print_json, print_warnings};

/// Arguments for `orchard new`.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Workspace name. A name like "brave-otter" is generated when omitted.
    pub name: Option<String>,

    /// Branch to check out; created when missing. Defaults to the name.
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Start point for a new branch. Defaults to the default branch.
    #[arg(long)]
    pub base: Option<String>,

    /// Succeed with the existing workspace if the name is taken.
    #[arg(long)]
    pub existing_ok: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl NewArgs {
    pub fn run(self) -> Result<()> {
        let lifecycle = lifecycle()?;
        let ctx = lifecycle.open_repo(&cwd()?)?;
        let outcome = lifecycle.create(
            &ctx,
            &CreateRequest {
                name: self.name,
                branch: self.branch,
                base: self.base,
                existing_ok: self.existing_ok,
            },
        )?;

        if self.json {
            return print_json(&outcome);
        }

        print_warnings(&outcome.warnings);
        let ws = &outcome.workspace;
        let verb = if outcome.created { "Created" } else { "Found existing" };
        println!(
            "{} {verb} workspace '{}' on branch '{}'",
            "✓".green(),
            ws.name.as_str().bold(),
            ws.branch,
        );
        println!("  path:  {}", ws.path.display());
        println!(
            "  ports: {}",
            port_range(ws.port, ctx.config.port_block_size)
        );
        Ok(())
    }
}
