//! formtex command-line front end.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod json_types;

#[derive(Parser, Debug)]
#[command(name = "formtex")]
#[command(version)]
#[command(about = "Formula text to LaTeX converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a formula to LaTeX
    Convert(commands::convert::ConvertArgs),

    /// Rewrite LaTeX back into formula text (best effort)
    Sync(commands::sync::SyncArgs),

    /// Attach a subscript to the last occurrence of a parameter
    Subscript(commands::subscript::SubscriptArgs),
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Sync(args) => commands::sync::run(args),
        Commands::Subscript(args) => commands::subscript::run(args),
    }
}
