//! CLI tool for inspecting the order ledger.
//!
//! Provides commands for:
//! - Listing orders newest first with per-colour totals
//! - Printing overall totals and the order count
//! - Printing the file header used by each order mode

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use order_ledger_core::aggregate::{summarize, totals};
use order_ledger_core::catalog::Variant;
use order_ledger_core::config::{LedgerConfig, OrderMode};
use order_ledger_core::persistence::{order_files, LedgerSchema, LedgerStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the ledger
    #[arg(long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every order, newest first
    Summary {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print totals per colour and the number of orders
    Totals,
    /// Print the CSV header written in the given mode
    Columns {
        #[arg(long, default_value = "ledger")]
        mode: OrderMode,
    },
}

fn load_store(data_dir: PathBuf) -> anyhow::Result<order_ledger_core::Ledger> {
    let config = LedgerConfig {
        data_dir,
        ..Default::default()
    };
    let store = LedgerStore::new(&config);
    tracing::debug!("Reading {}", store.path().display());
    store
        .try_load()
        .with_context(|| format!("Failed to read {}", store.path().display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Summary { json } => {
            let ledger = load_store(cli.data_dir)?;
            let orders = summarize(&ledger);
            if json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
                return Ok(());
            }
            for order in &orders {
                let per_variant: Vec<String> = Variant::ALL
                    .iter()
                    .map(|v| format!("{}={}", v, order.total_for(*v)))
                    .collect();
                println!(
                    "{}\t{}\t{}\ttotal={}",
                    order.timestamp,
                    order.customer_name,
                    per_variant.join("\t"),
                    order.total_overall
                );
            }
        }
        Command::Totals => {
            let ledger = load_store(cli.data_dir)?;
            let totals = totals(&ledger);
            for variant in Variant::ALL {
                println!("{}: {}", variant, totals.get(&variant).copied().unwrap_or(0));
            }
            println!("Pedidos: {}", ledger.len());
        }
        Command::Columns { mode } => {
            let header = match mode {
                OrderMode::Ledger => LedgerSchema::new(mode.catalog()).headers(),
                OrderMode::PerCustomer => {
                    order_files::HEADERS.iter().map(|h| h.to_string()).collect()
                }
            };
            println!("{}", header.join(","));
        }
    }

    Ok(())
}
