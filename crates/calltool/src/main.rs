//! Command-line tool for contract-call transactions.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `info`);
//! command output goes to stdout.

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::cli::Cli;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Cli::parse().run()
}
