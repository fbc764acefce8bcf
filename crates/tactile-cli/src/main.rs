//! Tactile CLI - replay recorded touch traces through the gesture recognizer.

#![allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]

mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::replay::Format;

#[derive(Parser)]
#[command(name = "tactile")]
#[command(about = "Touch gesture recognition and input dispatch tools")]
#[command(version)]
struct Cli {
    /// Log recognizer and dispatch decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded touch trace and print the recognized gestures
    Replay {
        /// Path to a JSON touch trace
        trace: PathBuf,

        /// TOML input config (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print an input config as TOML
    Config {
        /// Config to validate and print (defaults when omitted)
        path: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tactile_core=trace,tactile=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay {
            trace,
            config,
            format,
        } => {
            let config = replay::load_config(config.as_deref())?;
            let trace = replay::load_trace(&trace)?;
            let summary = replay::replay(&trace, config)?;
            print!("{}", replay::render(&summary, format)?);
        }
        Commands::Config { path } => {
            let config = replay::load_config(path.as_deref())?;
            let text = config
                .to_toml_string()
                .context("failed to render config")?;
            print!("{text}");
        }
    }
    Ok(())
}
