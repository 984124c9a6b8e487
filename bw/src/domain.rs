//! Domain types shared by the client, store and detector

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SHORT_REVISION_LEN;

/// The single branch of a single repository watched by one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl WatchTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Opaque commit identifier (a content hash)
///
/// Compared by exact string equality. The short form is for display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters used when showing a revision to people
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_REVISION_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RevisionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One commit in a comparison, message cut to its first line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: RevisionId,
    pub message: String,
    pub author: String,
}

impl CommitSummary {
    pub fn new(sha: impl Into<RevisionId>, message: &str, author: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: first_line(message).to_string(),
            author: author.into(),
        }
    }
}

/// A changed file and the status string reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub status: String,
}

impl FileChange {
    pub fn new(path: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: status.into(),
        }
    }
}

/// Result of a three-dot comparison between two revisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub ahead_by: u64,
    pub commits: Vec<CommitSummary>,
    pub files: Vec<FileChange>,
}

/// Outcome of one watch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeReport {
    /// No cursor existed; the current tip is now the baseline
    FirstRun { observed_tip: RevisionId },

    /// The tip matches the cursor
    NoChange { tip: RevisionId },

    /// The tip moved since the last run
    Changed {
        previous_tip: RevisionId,
        new_tip: RevisionId,
        ahead_by: u64,
        commits: Vec<CommitSummary>,
        files: Vec<FileChange>,
    },
}

impl ChangeReport {
    /// The tip observed during the run that produced this report
    pub fn tip(&self) -> &RevisionId {
        match self {
            ChangeReport::FirstRun { observed_tip } => observed_tip,
            ChangeReport::NoChange { tip } => tip,
            ChangeReport::Changed { new_tip, .. } => new_tip,
        }
    }

    pub fn has_changes(&self) -> bool {
        matches!(self, ChangeReport::Changed { .. })
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}
