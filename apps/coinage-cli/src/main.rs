//! Coinage CLI - change calculation from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use coinage_core::ModePolicy;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{batch, change, locales};
use config::Overrides;

/// Coinage - work out the change to hand back
#[derive(Parser)]
#[command(name = "coinage", version, about, long_about = None)]
struct Cli {
    /// Path to a coinage.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate change for one transaction
    Change {
        /// Amount owed, e.g. 2.12
        #[arg(long)]
        owed: String,
        /// Amount paid, e.g. 3.00
        #[arg(long)]
        paid: String,
        #[command(flatten)]
        engine: EngineArgs,
        /// Output the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process a file of "owed,paid" lines
    Batch {
        /// Input file, or - for stdin
        file: PathBuf,
        /// Emit the detailed JSON report instead of plain text
        #[arg(long)]
        detailed: bool,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List supported locales
    Locales {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Flags that override the loaded configuration.
#[derive(Args, Debug, Clone, Default)]
struct EngineArgs {
    /// Locale id (en-US, fr-FR)
    #[arg(long)]
    locale: Option<String>,
    /// Random-mode divisor (at least 1)
    #[arg(long)]
    divisor: Option<i64>,
    /// optimal, random or auto
    #[arg(long)]
    mode: Option<ModePolicy>,
    /// Seed the random strategy for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl From<EngineArgs> for Overrides {
    fn from(args: EngineArgs) -> Self {
        Overrides {
            locale: args.locale,
            divisor: args.divisor,
            mode: args.mode,
            seed: args.seed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only results.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "warn,coinage=debug"
        } else {
            "warn,coinage=info"
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Change {
            owed,
            paid,
            engine,
            json,
        } => change::run(config_path, engine.into(), &owed, &paid, json),
        Commands::Batch {
            file,
            detailed,
            output,
            engine,
        } => batch::run(config_path, engine.into(), &file, detailed, output.as_deref()),
        Commands::Locales { json } => locales::run(json),
    }
}
