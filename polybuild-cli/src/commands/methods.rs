//! `polybuild methods` — show the remote method registry.

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use polybuild_api::MethodRegistry;

/// Arguments for `polybuild methods`.
#[derive(Args, Debug)]
pub struct MethodsArgs {
    /// Only list methods that change the remote problem.
    #[arg(long)]
    pub mutating: bool,
}

#[derive(Tabled)]
struct MethodRow {
    #[tabled(rename = "operation")]
    key: &'static str,
    #[tabled(rename = "remote method")]
    name: &'static str,
    #[tabled(rename = "access")]
    access: &'static str,
    #[tabled(rename = "confirmed")]
    confirmed: &'static str,
}

impl MethodsArgs {
    pub fn run(self) -> Result<()> {
        let registry = MethodRegistry::polygon();
        let rows: Vec<MethodRow> = registry
            .entries()
            .filter(|(_, entry)| !self.mutating || entry.mutating)
            .map(|(key, entry)| MethodRow {
                key,
                name: entry.name,
                access: if entry.mutating { "write" } else { "read" },
                confirmed: if entry.confirmed { "yes" } else { "no" },
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
