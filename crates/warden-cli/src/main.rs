//! # warden CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use warden_cli::check::{run_check, CheckArgs};
use warden_cli::compile::{run_compile, CompileArgs};
use warden_cli::map::{run_map, MapArgs};
use warden_cli::query::{run_query, QueryArgs};

/// Schema warden: path queries, type checks, validation and sanitizing for
/// JSON and YAML payloads.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every schema path present in a payload.
    Map(MapArgs),

    /// Run a path query and print matched values and the inspection report.
    Query(QueryArgs),

    /// Compile paths and print their segments.
    Compile(CompileArgs),

    /// Apply a schema document to a payload.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Map(args) => run_map(&args),
        Commands::Query(args) => run_query(&args),
        Commands::Compile(args) => run_compile(&args),
        Commands::Check(args) => run_check(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
