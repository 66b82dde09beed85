//! `orchard repo add|remove|list`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use orchard_core::repos::default_repo_name;
use orchard_core::{CoreError, RepoName, RepoRegistry, Repository};

use crate::context::{cwd, home, lifecycle};
use crate::output::print_json;

/// Manage the repository registry.
#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// Register a repository for global lookup and port surveys.
    Add(AddArgs),

    /// Forget a registered repository. Its workspaces are left untouched.
    Remove(RemoveArgs),

    /// List registered repositories.
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Any directory inside the repository. Defaults to the current one.
    pub path: Option<PathBuf>,

    /// Registry name. Defaults to the repository directory's name.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "path")]
    path: String,
}

pub fn run(cmd: RepoCommand) -> Result<()> {
    match cmd {
        RepoCommand::Add(args) => add(args),
        RepoCommand::Remove(args) => remove(args),
        RepoCommand::List(args) => list(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let lifecycle = lifecycle()?;
    let dir = match args.path {
        Some(path) => path,
        None => cwd()?,
    };
    let root = lifecycle
        .tools()
        .vcs
        .root_worktree(&dir)
        .map_err(CoreError::from)
        .with_context(|| format!("{} is not inside a git repository", dir.display()))?;
    let name = match args.name {
        Some(name) => RepoName::parse(&name)?,
        None => default_repo_name(&root),
    };

    let mut repos = RepoRegistry::load_at(lifecycle.home())?;
    repos.add(Repository {
        name: name.clone(),
        path: root.clone(),
    })?;
    repos.save_at(lifecycle.home())?;
    println!(
        "{} Registered '{}' ({})",
        "✓".green(),
        name.as_str().bold(),
        root.display()
    );
    Ok(())
}

fn remove(args: RemoveArgs) -> Result<()> {
    let home = home()?;
    let mut repos = RepoRegistry::load_at(&home)?;
    let removed = repos.remove(&args.name)?;
    repos.save_at(&home)?;
    println!("{} Removed '{}'", "✓".green(), removed.name);
    Ok(())
}

fn list(args: ListArgs) -> Result<()> {
    let repos = RepoRegistry::load_at(&home()?)?;
    if args.json {
        return print_json(&repos.repositories);
    }
    if repos.repositories.is_empty() {
        println!("No repositories registered.");
        println!("Run: orchard repo add <path>");
        return Ok(());
    }
    let rows: Vec<RepoRow> = repos
        .repositories
        .iter()
        .map(|repo| RepoRow {
            name: repo.name.to_string(),
            path: repo.path.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
