//! xdom CLI - Document conversion.
//!
//! Provides commands for:
//! - `convert`: Convert a document between syntaxes
//! - `syntaxes`: List the available parsers and renderers
//! - `macros`: List the built-in macros

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, MacrosArgs};
use output::Output;

/// xdom - Document conversion between wiki syntaxes.
#[derive(Parser)]
#[command(name = "xdom", version, about)]
struct Cli {
    /// Log progress at INFO level (otherwise RUST_LOG applies).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document from one syntax to another.
    Convert(ConvertArgs),
    /// List the syntaxes that can be read and written.
    Syntaxes,
    /// List the built-in macros.
    Macros(MacrosArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Syntaxes => commands::syntaxes::execute(),
        Commands::Macros(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
