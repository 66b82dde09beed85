//! `orchard list`: workspaces of the current repository or of all.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use orchard_core::Workspace;
use orchard_lifecycle::{Lifecycle, RepoListing};

use crate::context::{cwd, lifecycle};
use crate::output::{age, print_json};

/// Arguments for `orchard list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// List every registered repository. Implied outside a repository.
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct WorkspaceRow {
    #[tabled(rename = "workspace")]
    name: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "port")]
    port: u16,
    #[tabled(rename = "age")]
    age: String,
    #[tabled(rename = "path")]
    path: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let lifecycle = lifecycle()?;
        if !self.all {
            match lifecycle.open_repo(&cwd()?) {
                Ok(ctx) => {
                    let workspaces = lifecycle.list(&ctx)?;
                    if self.json {
                        return print_json(&workspaces);
                    }
                    println!("{}", ctx.name.as_str().to_uppercase().bold());
                    print_workspaces(&workspaces);
                    return Ok(());
                }
                Err(err) => {
                    tracing::debug!(error = %err, "not in a repository; listing all");
                }
            }
        }
        list_all(&lifecycle, self.json)
    }
}

fn list_all(lifecycle: &Lifecycle, json: bool) -> Result<()> {
    let listings = lifecycle.list_all()?;
    if json {
        return print_json(&listings);
    }
    if listings.is_empty() {
        println!("No repositories registered.");
        println!("Run: orchard repo add <path>");
        return Ok(());
    }
    for RepoListing {
        repo,
        workspaces,
        error,
    } in &listings
    {
        println!(
            "{} {}",
            repo.name.as_str().to_uppercase().bold(),
            repo.path.display().to_string().bright_black(),
        );
        match error {
            Some(error) => println!("  {} {error}", "unavailable:".red()),
            None => print_workspaces(workspaces),
        }
    }
    Ok(())
}

fn print_workspaces(workspaces: &[Workspace]) {
    if workspaces.is_empty() {
        println!("  no workspaces");
        return;
    }
    let now = Utc::now();
    let rows: Vec<WorkspaceRow> = workspaces
        .iter()
        .map(|ws| WorkspaceRow {
            name: ws.name.to_string(),
            branch: ws.branch.clone(),
            port: ws.port,
            age: age(ws.created_at, now),
            path: ws.path.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
