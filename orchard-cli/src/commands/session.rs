//! `orchard run`, `orchard stop`, `orchard logs`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use orchard_lifecycle::{Resolved, DEFAULT_LOG_LINES};

use super::show::Target;
use crate::context::{cwd, lifecycle};

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(flatten)]
    pub target: Target,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    #[command(flatten)]
    pub target: Target,

    /// Number of most recent lines to print.
    #[arg(long, short = 'n', default_value_t = DEFAULT_LOG_LINES)]
    pub lines: usize,
}

fn resolve(lifecycle: &orchard_lifecycle::Lifecycle, target: &Target) -> Result<Resolved> {
    Ok(lifecycle.resolve(&cwd()?, target.name.as_deref(), target.repo.as_deref())?)
}

pub fn run(args: SessionArgs) -> Result<()> {
    let lifecycle = lifecycle()?;
    let Resolved { ctx, workspace } = resolve(&lifecycle, &args.target)?;
    let outcome = lifecycle.run(&ctx, &workspace)?;
    println!(
        "{} Started '{}' in session {} (PORT={})",
        "✓".green(),
        outcome.command,
        outcome.session.bold(),
        outcome.port,
    );
    Ok(())
}

pub fn stop(args: SessionArgs) -> Result<()> {
    let lifecycle = lifecycle()?;
    let Resolved { ctx, workspace } = resolve(&lifecycle, &args.target)?;
    let session = lifecycle.stop(&ctx, &workspace)?;
    println!("{} Stopped session {}", "✓".green(), session.bold());
    Ok(())
}

impl LogsArgs {
    pub fn run(self) -> Result<()> {
        let lifecycle = lifecycle()?;
        let Resolved { ctx, workspace } = resolve(&lifecycle, &self.target)?;
        let output = lifecycle.logs(&ctx, &workspace, self.lines)?;
        println!("{output}");
        Ok(())
    }
}
