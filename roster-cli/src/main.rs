//! Roster CLI - command line interface for the review roster
//!
//! Assigns pull request reviewers from the author's team, replaces
//! reviewers, and reports reviewer load.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use roster_core::Config;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{App, PrArgs, StatsArgs, TeamArgs, UserArgs};

/// Roster: reviewer assignment for team pull requests
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true, env = "ROSTER_DB_PATH")]
    db: Option<PathBuf>,

    /// Deadline for each operation, e.g. `5s` (overrides config and env)
    #[arg(long, global = true, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show current configuration
    Config,

    /// Manage teams and their members
    #[command(visible_alias = "t")]
    Team(TeamArgs),

    /// Manage users
    #[command(visible_alias = "u")]
    User(UserArgs),

    /// Open, inspect, merge and reassign pull requests
    Pr(PrArgs),

    /// Show review counts per user
    Stats(StatsArgs),
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    roster_core::config::parse_duration(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine readable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::report_error(&e, json);
            ExitCode::from(output::exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.db.clone(), cli.timeout)?;

    if cli.verbose {
        tracing::info!(
            db_path = %config.database.path.display(),
            reviewers_per_pr = config.assignment.reviewers_per_pr,
            timeout = ?config.operation.timeout,
            "Configuration loaded"
        );
    }

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Roster - reviewer assignment for team pull requests");
            println!();
            println!("Use --help for usage information");
            return Ok(());
        }
    };

    match command {
        Commands::Version => {
            println!("roster {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Config => show_config(&config, cli.json)?,
        Commands::Team(args) => args.execute(&open_app(&config, cli.json).await?).await?,
        Commands::User(args) => args.execute(&open_app(&config, cli.json).await?).await?,
        Commands::Pr(args) => args.execute(&open_app(&config, cli.json).await?).await?,
        Commands::Stats(args) => args.execute(&open_app(&config, cli.json).await?).await?,
    }

    Ok(())
}

/// Open the store and cancel in-flight work on Ctrl-C
async fn open_app(config: &Config, json: bool) -> anyhow::Result<App> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, rolling back");
            on_interrupt.cancel();
        }
    });

    App::open(config, json, cancel).await
}

fn show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Roster Configuration");
    println!("====================");
    println!();
    println!("Database Settings:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!("  busy_timeout: {:?}", config.database.busy_timeout);
    println!();
    println!("Assignment Settings:");
    println!("  reviewers_per_pr: {}", config.assignment.reviewers_per_pr);
    println!();
    println!("Operation Settings:");
    match config.operation.timeout {
        Some(t) => println!("  timeout: {:?}", t),
        None => println!("  timeout: (none)"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
    Ok(())
}
