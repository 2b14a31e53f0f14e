//! NSC Exchange launcher
//!
//! Loads the exchange configuration, initializes logging (daily-rolling
//! file under the exchange home plus console), and dispatches to the CLI
//! commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nsc_exchange::ExchangeConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

mod cli;

const DEFAULT_LOG_FILTER: &str = "nsc_exchange=info,nsc_engine=info";

#[derive(Parser, Debug)]
#[command(name = "nsc_exchange", about = "Clearinghouse report file exchange")]
struct Cli {
    /// Path to the exchange configuration file
    #[arg(
        short = 'c',
        long,
        global = true,
        env = "NSC_EXCHANGE_CONFIG",
        default_value = "nsc.yml"
    )]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve, classify, rename, and import incoming files
    Receive {
        /// Classify and report without fetching, moving, or importing
        #[arg(long)]
        dry_run: bool,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload outbound files and archive the local copies
    Send {
        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview the outcome for one raw filename
    Classify {
        /// Raw filename as delivered (convention prefix included)
        filename: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configured rename rules
    Rules {
        #[command(subcommand)]
        action: cli::rules::RulesAction,
    },

    /// Show the resolved configuration (password masked)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Receive { json, .. } => *json,
        Commands::Send { json } => *json,
        Commands::Classify { json, .. } => *json,
        Commands::Config { json } => *json,
        Commands::Rules { action } => matches!(action, cli::rules::RulesAction::List { json: true }),
    }
}

/// Exchange home directory: `~/.nsc_exchange`, `NSC_EXCHANGE_HOME` override.
fn exchange_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("NSC_EXCHANGE_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".nsc_exchange")
}

fn ensure_logs_dir() -> std::io::Result<PathBuf> {
    let logs = exchange_home().join("logs");
    std::fs::create_dir_all(&logs)?;
    Ok(logs)
}

fn run_command(cli: Cli) -> Result<()> {
    let config = ExchangeConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Commands::Receive { dry_run, json } => {
            cli::receive::run(&config, cli::receive::ReceiveArgs { dry_run, json })
        }
        Commands::Send { json } => cli::send::run(&config, cli::send::SendArgs { json }),
        Commands::Classify { filename, json } => {
            cli::classify::run(&config, cli::classify::ClassifyArgs { filename, json })
        }
        Commands::Rules { action } => cli::rules::run(&config, action),
        Commands::Config { json } => cli::config::run(&config, cli::config::ConfigArgs { json }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let default_filter = if cli.verbose {
        "nsc_exchange=debug,nsc_engine=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let mut _log_guard: Option<tracing_appender::non_blocking::WorkerGuard> = None;
    let file_layer = match ensure_logs_dir() {
        Ok(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "nsc_exchange.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            _log_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_filter(env_filter.clone()),
            )
        }
        Err(err) => {
            eprintln!("Warning: failed to create logs directory: {err}");
            None
        }
    };

    // JSON output owns stdout; route diagnostics to stderr there.
    let console_writer = if json_mode {
        tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr)
    } else {
        tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout)
    };
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(console_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::from(1)
        }
    }
}
