//! Wren front-end CLI
//!
//! Checks lambda scoping in parsed units and builds records from JSON schemas

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "Command-line tool reporting to the terminal"
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wr_driver::Config;

mod check;
mod construct;

/// Environment variable holding the log filter
const LOG_ENV: &str = "WREN_LOG";

#[derive(Parser)]
#[command(name = "wren")]
#[command(about = "Wren front-end checks", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./wren.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve lambda parameters and report shadowing
    Check {
        /// Unit files (JSON) or directories containing them
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Construct a record from a schema and named arguments
    Construct {
        /// Schema file (JSON, one schema or an array)
        #[arg(long)]
        schema: PathBuf,

        /// Record kind to construct
        #[arg(long)]
        kind: String,

        /// Named arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Methods to invoke on the constructed record
        #[arg(long = "call")]
        calls: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir().context("no working directory")?)?,
    };
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Check { paths, format } => {
            check::run_check(config, &paths, &format)?;
        }
        Commands::Construct {
            schema,
            kind,
            args,
            calls,
            format,
        } => {
            construct::run_construct(config, &schema, &kind, &args, &calls, &format)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
