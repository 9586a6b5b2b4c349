//! gridcalc CLI - runs spreadsheet edit scripts

mod script;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use gridcalc::Sheet;
use script::run_script;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Run a spreadsheet edit script")]
struct Cli {
    /// Script to run, one command per line (default: stdin)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Print the sheet after the script has run
    #[arg(short, long, value_enum)]
    print: Option<Dump>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Dump {
    Values,
    Texts,
    Both,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            eprintln!("{} command(s) failed", failures);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<usize> {
    let mut sheet = Sheet::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut errors = io::stderr();

    let failures = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            run_script(&mut sheet, BufReader::new(file), &mut out, &mut errors)?
        }
        None => run_script(&mut sheet, io::stdin().lock(), &mut out, &mut errors)?,
    };

    if let Some(dump) = cli.print {
        if matches!(dump, Dump::Values | Dump::Both) {
            sheet
                .print_values(&mut out)
                .context("Failed to print values")?;
        }
        if dump == Dump::Both {
            writeln!(out)?;
        }
        if matches!(dump, Dump::Texts | Dump::Both) {
            sheet.print_texts(&mut out).context("Failed to print texts")?;
        }
    }

    let stats = sheet.stats();
    tracing::debug!(
        cells = stats.cells,
        evaluations = stats.evaluations,
        cache_hits = stats.cache_hits,
        invalidations = stats.invalidations,
        "script finished"
    );

    out.flush()?;
    Ok(failures)
}
