//! Orchard: ephemeral git-worktree workspaces with reserved port blocks.
//!
//! # Usage
//!
//! ```text
//! orchard new [NAME] [--branch B] [--base REF] [--existing-ok] [--json]
//! orchard archive [NAME] [--repo R] [--force] [--missing-ok] [--delete-branch]
//! orchard rename OLD NEW [--repo R]
//! orchard list [--all] [--json]
//! orchard path [NAME] [--repo R]
//! orchard show [NAME] [--repo R] [--json]
//! orchard run|stop [NAME] [--repo R]
//! orchard logs [NAME] [--repo R] [--lines N]
//! orchard ports [--json]
//! orchard repo add [PATH] [--name N] | remove NAME | list [--json]
//! orchard serve
//! ```
//!
//! Workspace arguments resolve against the current repository first and
//! fall back to every registered repository when run outside one.

mod commands;
mod context;
mod exit_code;
mod logging;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::{
    archive::ArchiveArgs,
    list::ListArgs,
    new::NewArgs,
    ports::PortsArgs,
    rename::RenameArgs,
    repo::RepoCommand,
    session::{LogsArgs, SessionArgs},
    show::{PathArgs, ShowArgs},
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "orchard",
    version,
    about = "Ephemeral git worktree workspaces with reserved port blocks",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a workspace in the current repository.
    New(NewArgs),

    /// Remove a workspace's worktree and free its port block.
    Archive(ArchiveArgs),

    /// Rename a workspace and move its worktree.
    Rename(RenameArgs),

    /// List workspaces of the current repository, or of all with --all.
    List(ListArgs),

    /// Print a workspace's directory.
    Path(PathArgs),

    /// Show a workspace's details and session status.
    Show(ShowArgs),

    /// Start the repository's run script in the workspace's session.
    Run(SessionArgs),

    /// Stop the workspace's session.
    Stop(SessionArgs),

    /// Print recent output of the workspace's session.
    Logs(LogsArgs),

    /// Show every allocated port block.
    Ports(PortsArgs),

    /// Manage the repository registry.
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },

    /// Serve newline-delimited JSON requests on stdin for agents.
    Serve,
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::New(args) => args.json,
            Commands::List(args) => args.json,
            Commands::Show(args) => args.json,
            Commands::Ports(args) => args.json,
            Commands::Repo {
                command: RepoCommand::List(args),
            } => args.json,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let json = cli.command.json();
    let result = match cli.command {
        Commands::New(args) => args.run(),
        Commands::Archive(args) => args.run(),
        Commands::Rename(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Path(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Run(args) => commands::session::run(args),
        Commands::Stop(args) => commands::session::stop(args),
        Commands::Logs(args) => args.run(),
        Commands::Ports(args) => args.run(),
        Commands::Repo { command } => commands::repo::run(command),
        Commands::Serve => commands::serve::run(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_code::report(&err, json),
    }
}
