//! CLI Tooling
//!
//! Command-line interface for publishing artifacts and inspecting the
//! transaction logs. Output is plain text by default, JSON on request.

use crate::log::Transaction;
use crate::logging::LogFormat;
use crate::store::Store;
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Symstore CLI - content-addressed storage for debugging artifacts
#[derive(Parser)]
#[command(name = "symstore")]
#[command(about = "Content-addressed storage for Windows debugging artifacts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish files into the store as one transaction
    Add {
        /// Store root directory
        store: PathBuf,

        /// Files to publish (pdb, pd_, exe, dll, ex_, dl_)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Product name recorded with the transaction
        #[arg(long)]
        product: String,

        /// Product version recorded with the transaction
        #[arg(long)]
        version: String,
    },

    /// List every transaction ever recorded, in append order
    History {
        /// Store root directory
        store: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the current transactions, keyed by id
    Transactions {
        /// Store root directory
        store: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Machine-readable view of one transaction.
#[derive(Serialize)]
struct TransactionSummary {
    id: String,
    kind: &'static str,
    reference: &'static str,
    timestamp: String,
    product: String,
    version: String,
    comment: String,
}

impl From<&Transaction> for TransactionSummary {
    fn from(transaction: &Transaction) -> Self {
        let record = transaction.record();
        TransactionSummary {
            id: record.id.to_string(),
            kind: record.kind.as_str(),
            reference: record.reference.as_str(),
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            product: record.product.clone(),
            version: record.version.clone(),
            comment: record.comment.clone(),
        }
    }
}

/// Execute a parsed command.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Add {
            store,
            files,
            product,
            version,
        } => {
            let store = Store::new(&store);
            let id = store
                .add(&files, &product, &version)
                .with_context(|| format!("failed to publish into {}", store.root().display()))?;
            println!("{id}");
        }
        Commands::History { store, json } => {
            let history = Store::new(&store).history()?;
            let summaries: Vec<TransactionSummary> = history.iter().map(Into::into).collect();
            print_summaries(&summaries, json)?;
        }
        Commands::Transactions { store, json } => {
            let transactions = Store::new(&store).transactions()?;
            let summaries: Vec<TransactionSummary> = transactions
                .iter()
                .map(|(_, transaction)| transaction.into())
                .collect();
            print_summaries(&summaries, json)?;
        }
    }
    Ok(())
}

fn print_summaries(summaries: &[TransactionSummary], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  {}  {} {}  {}",
            summary.id, summary.timestamp, summary.product, summary.version, summary.comment
        );
    }
    Ok(())
}
