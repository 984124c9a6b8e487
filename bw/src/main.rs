//! BranchWatch - remote branch change watcher
//!
//! CLI entry point. Meant to be invoked by an external scheduler once per check.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, error, info, warn};

use branchwatch::cli::{Cli, Command, OutputFormat};
use branchwatch::config::Config;
use branchwatch::{CursorStore, Detector, GitHubClient, report};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_overrides(&cli.overrides());

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_check(&config, false, OutputFormat::Text).await,
        Some(Command::Check { dry_run, format }) => cmd_check(&config, dry_run, format).await,
        Some(Command::Cursor) => cmd_cursor(&config),
        Some(Command::Reset) => cmd_reset(&config),
    }
}

async fn cmd_check(config: &Config, dry_run: bool, format: OutputFormat) -> Result<()> {
    // Credential is checked here, before any network activity
    let resolved = config.resolve()?;

    info!(watch = %resolved.target, "Checking changes");

    let client = GitHubClient::from_config(&resolved)?;
    let store = CursorStore::new(&resolved.tracking_dir);

    let report = match Detector::new(&resolved.target, &client, &store)
        .dry_run(dry_run)
        .check()
        .await
    {
        Ok(report) => report,
        Err(e) => {
            if e.is_fatal() {
                error!(error = %e, "Check failed, not retryable until configuration is fixed");
            } else if e.is_retryable() {
                warn!(error = %e, "Check failed, cursor unchanged, next run will retry");
            }
            return Err(e).context(format!("Check failed for {}", resolved.target));
        }
    };

    info!(
        watch = %resolved.target,
        tip = %report.tip().short(),
        changed = report.has_changes(),
        "Check complete"
    );

    let output = match format {
        OutputFormat::Text => report::render(&report),
        OutputFormat::Json => report::render_json(&report).context("Failed to serialize report")?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_cursor(config: &Config) -> Result<()> {
    let target = config.target()?;
    let store = CursorStore::new(&config.tracking_dir);
    let path = store.cursor_path(&target);

    match store.read(&target)? {
        Some(rev) => println!("{} {}", target.to_string().cyan(), rev),
        None => println!("{} {}", target.to_string().cyan(), "not initialized".dimmed()),
    }
    println!("  {}", path.display().to_string().dimmed());
    Ok(())
}

fn cmd_reset(config: &Config) -> Result<()> {
    let target = config.target()?;
    let store = CursorStore::new(&config.tracking_dir);

    if store.clear(&target)? {
        println!("{} Cleared cursor for {}", "✓".green(), target.to_string().cyan());
    } else {
        println!("No cursor stored for {}", target.to_string().cyan());
    }
    Ok(())
}
