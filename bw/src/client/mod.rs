//! Source-control client for BranchWatch
//!
//! Read-only access to a hosted repository's history: the tip of a branch and
//! the three-dot comparison between two revisions.

use async_trait::async_trait;

mod github;

pub use github::GitHubClient;

use crate::domain::{Comparison, RevisionId, WatchTarget};
use crate::error::WatchError;

/// Read-only view of a remote repository
///
/// Implementations must bound every call with a timeout and report it as
/// `WatchError::Timeout` instead of blocking.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Current tip revision of the target's branch
    async fn tip_revision(&self, target: &WatchTarget) -> Result<RevisionId, WatchError>;

    /// Commits reachable from `to` but not `from`, plus the files they touch
    async fn compare(&self, target: &WatchTarget, from: &RevisionId, to: &RevisionId)
    -> Result<Comparison, WatchError>;
}
