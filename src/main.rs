use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use insert_rdtsc::error::Error;
use insert_rdtsc::report::{diff_captures, format_table, latest_capture, load_capture};

#[derive(Parser)]
#[command(
    name = "insert-rdtsc",
    about = "Inspect and compare call captures recorded by rdtsc-runtime",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a CSV capture as a per-function table.
    Report {
        /// Path to a capture file. If omitted, uses the newest .csv in the
        /// current directory.
        capture: Option<PathBuf>,
    },
    /// Compare two CSV captures per function.
    Diff {
        /// Baseline capture.
        a: PathBuf,
        /// Capture to compare against the baseline.
        b: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Commands::Report { capture } => cmd_report(capture),
        Commands::Diff { a, b } => cmd_diff(a, b),
    }
}

fn cmd_report(capture: Option<PathBuf>) -> Result<(), Error> {
    let path = match capture {
        Some(p) => p,
        None => latest_capture(&std::env::current_dir()?)?,
    };
    let records = load_capture(&path)?;
    print!("{}", format_table(&records));
    Ok(())
}

fn cmd_diff(a: PathBuf, b: PathBuf) -> Result<(), Error> {
    let records_a = load_capture(&a)?;
    let records_b = load_capture(&b)?;
    print!("{}", diff_captures(&records_a, &records_b));
    Ok(())
}
