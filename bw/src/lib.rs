//! BranchWatch - remote branch change watcher
//!
//! Each invocation checks one branch of one hosted repository, compares its
//! tip against the revision recorded by the previous run, and summarizes any
//! new commits and changed files. Scheduling and notification live outside
//! this crate: a periodic trigger runs `bw check`, and whatever consumes its
//! output decides who to tell.
//!
//! # Architecture
//!
//! ```text
//! Detector ──► SourceControl (GitHub REST API)
//!    │
//!    └──────► CursorStore (tracking/{repo}_{branch}.sha)
//!    │
//!    ▼
//! ChangeReport ──► report::render
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and credential resolution
//! - [`domain`] - Watch target, revisions and the change report
//! - [`store`] - Persisted cursor per (repository, branch)
//! - [`client`] - Source-control client trait and GitHub implementation
//! - [`detector`] - First-run / no-change / changed decision
//! - [`report`] - Human-readable rendering of a report
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod client;
pub mod config;
pub mod detector;
pub mod domain;
mod error;
pub mod report;
pub mod store;

pub use client::{GitHubClient, SourceControl};
pub use config::{Config, ResolvedConfig};
pub use detector::Detector;
pub use domain::{ChangeReport, CommitSummary, Comparison, FileChange, RevisionId, WatchTarget};
pub use error::WatchError;
pub use store::CursorStore;

/// Default request timeout for the hosting API (30s)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Number of leading characters shown for a revision in reports
pub const SHORT_REVISION_LEN: usize = 7;
