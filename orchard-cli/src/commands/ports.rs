//! `orchard ports`: every allocated port block.

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use crate::context::lifecycle;
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct PortsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "ports")]
    ports: String,
    #[tabled(rename = "repository")]
    repo: String,
    #[tabled(rename = "workspace")]
    workspace: String,
}

impl PortsArgs {
    pub fn run(self) -> Result<()> {
        let blocks = lifecycle()?.port_blocks()?;
        if self.json {
            return print_json(&blocks);
        }
        if blocks.is_empty() {
            println!("No port blocks allocated.");
            return Ok(());
        }
        let rows: Vec<PortRow> = blocks
            .into_iter()
            .map(|block| PortRow {
                ports: format!("{}-{}", block.start, block.end),
                repo: block.repo.to_string(),
                workspace: block.workspace.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
