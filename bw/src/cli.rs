//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::TargetOverrides;

/// BranchWatch - report new commits on a watched branch
#[derive(Parser, Debug)]
#[command(
    name = "bw",
    author,
    version,
    about = "Report new commits and changed files on a watched branch since the last check"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Repository owner (overrides config)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Repository name (overrides config)
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Branch to watch (overrides config and TARGET_BRANCH)
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Subcommand to execute (defaults to `check`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn overrides(&self) -> TargetOverrides {
        TargetOverrides {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
        }
    }
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the branch once and print what changed
    Check {
        /// Do not advance the stored cursor
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the stored cursor for the target
    Cursor,

    /// Forget the stored cursor so the next check starts over
    Reset,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
