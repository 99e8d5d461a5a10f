//! Lotbook command-line client.
//!
//! A form-style front end for the lot inventory: one subcommand per action
//! for scripting, or an interactive prompt session when no subcommand is
//! given.

mod commands;
mod formatter;
mod repl;

use clap::Parser;
use formatter::OutputFormat;
use lotbook_core::Workbook;
use std::path::PathBuf;

/// Lotbook command-line client.
#[derive(Parser, Debug)]
#[command(name = "lotbook")]
#[command(version, about = "Manage a lot inventory backed by a data file")]
pub struct Args {
    /// Data file path
    #[arg(short = 'f', long, default_value = lotbook_core::DEFAULT_DATA_FILE)]
    pub file: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<commands::Command>,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lotbook=info".parse().unwrap())
                .add_directive("lotbook_core=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut book = Workbook::open(&args.file);

    match args.command {
        // Command mode: execute a single action and exit.
        Some(command) => commands::execute(&mut book, command, args.format),
        // Interactive mode: the form session.
        None => repl::run(&mut book, args.format),
    }
}
