//! Symstore CLI Binary
//!
//! Command-line interface for the content-addressed artifact store.

use clap::Parser;
use std::process;
use symstore::logging;
use symstore::tooling::cli::{run, Cli};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level.as_deref(), cli.log_format) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
