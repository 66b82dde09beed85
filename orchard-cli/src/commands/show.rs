//! `orchard path` and `orchard show`: resolve a single workspace.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use orchard_core::{RepoName, Workspace};

use crate::context::{cwd, lifecycle};
use crate::output::{port_range, print_json};

/// Workspace selection shared by single-workspace commands.
#[derive(Args, Debug)]
pub struct Target {
    /// Workspace name. Defaults to the workspace containing the current
    /// directory.
    pub name: Option<String>,

    /// Look the workspace up in this registered repository.
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Args, Debug)]
pub struct PathArgs {
    #[command(flatten)]
    pub target: Target,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: Target,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ShowJson<'a> {
    repo: &'a RepoName,
    #[serde(flatten)]
    workspace: &'a Workspace,
    port_end: u16,
    running: bool,
}

impl PathArgs {
    pub fn run(self) -> Result<()> {
        let resolved = lifecycle()?.resolve(
            &cwd()?,
            self.target.name.as_deref(),
            self.target.repo.as_deref(),
        )?;
        println!("{}", resolved.workspace.path.display());
        Ok(())
    }
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let lifecycle = lifecycle()?;
        let resolved = lifecycle.resolve(
            &cwd()?,
            self.target.name.as_deref(),
            self.target.repo.as_deref(),
        )?;
        let (ctx, ws) = (&resolved.ctx, &resolved.workspace);
        let running = lifecycle.is_running(ctx, ws);
        let block_size = ctx.config.port_block_size;

        if self.json {
            return print_json(&ShowJson {
                repo: &ctx.name,
                workspace: ws,
                port_end: ws.port.saturating_add(block_size.saturating_sub(1)),
                running,
            });
        }

        let session = if running {
            "running".green()
        } else {
            "stopped".bright_black()
        };
        println!("{} ({})", ws.name.as_str().bold(), ctx.name);
        println!("  path:    {}", ws.path.display());
        println!("  branch:  {}", ws.branch);
        println!("  ports:   {}", port_range(ws.port, block_size));
        println!("  created: {}", ws.created_at.format("%Y-%m-%d %H:%M UTC"));
        println!("  session: {session}");
        Ok(())
    }
}
