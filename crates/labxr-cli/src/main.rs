//! labxr - drive the spatial anchoring and manipulation engine from a terminal

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod bench;
mod commands;

/// Spatial anchoring and object manipulation engine
#[derive(Parser)]
#[command(name = "labxr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scripted bench session and print manipulation events
    Demo {
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// List the anchors of the demo bench
    Anchors {
        /// Print anchors as a JSON array
        #[arg(long)]
        json: bool,

        /// Only anchors whose name starts with this prefix
        #[arg(long)]
        group: Option<String>,
    },

    /// View and verify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the configuration and report where it came from
    Check,
}

fn init_tracing(level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, path) = labxr_config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level, cli.verbose);
    match &path {
        Some(p) => tracing::debug!("Loaded configuration from {}", p.display()),
        None => tracing::debug!("No configuration file found, using defaults"),
    }

    match cli.command {
        Commands::Demo { json } => commands::demo(config, json),
        Commands::Anchors { json, group } => commands::anchors(config, json, group.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config_show(&config),
            ConfigCommands::Check => commands::config_check(&config, path.as_deref()),
        },
    }
}
