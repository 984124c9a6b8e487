//! Change detection for a single watch target
//!
//! One run moves through `Fetching -> { FirstRun | Unchanged | ComputingDiff -> Changed }`.
//! The cursor is only written after everything it depends on has succeeded,
//! so a failed or interrupted run leaves the previous cursor in place and the
//! next run retries the same range.

use tracing::{debug, info};

use crate::client::SourceControl;
use crate::domain::{ChangeReport, RevisionId, WatchTarget};
use crate::error::WatchError;
use crate::store::CursorStore;

/// Decides whether the watched branch moved since the last recorded run
pub struct Detector<'a> {
    target: &'a WatchTarget,
    client: &'a dyn SourceControl,
    store: &'a CursorStore,
    dry_run: bool,
}

impl<'a> Detector<'a> {
    pub fn new(target: &'a WatchTarget, client: &'a dyn SourceControl, store: &'a CursorStore) -> Self {
        Self {
            target,
            client,
            store,
            dry_run: false,
        }
    }

    /// Report what changed without advancing the cursor
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one check
    pub async fn check(&self) -> Result<ChangeReport, WatchError> {
        debug!(
            watch = %self.target,
            tracking_dir = ?self.store.base_path(),
            dry_run = self.dry_run,
            "check: called"
        );

        let tip = self.client.tip_revision(self.target).await?;
        info!(watch = %self.target, tip = %tip, "Latest commit");

        let Some(previous) = self.store.read(self.target)? else {
            info!("First run detected, saving latest commit as baseline");
            self.persist(&tip)?;
            return Ok(ChangeReport::FirstRun { observed_tip: tip });
        };

        if previous == tip {
            info!("No changes detected since last check");
            return Ok(ChangeReport::NoChange { tip });
        }

        debug!(%previous, %tip, "check: tip moved, comparing");
        let comparison = self.client.compare(self.target, &previous, &tip).await?;

        info!(
            previous = %previous.short(),
            tip = %tip.short(),
            ahead_by = comparison.ahead_by,
            commits = comparison.commits.len(),
            files = comparison.files.len(),
            "Changes detected"
        );

        self.persist(&tip)?;

        Ok(ChangeReport::Changed {
            previous_tip: previous,
            new_tip: tip,
            ahead_by: comparison.ahead_by,
            commits: comparison.commits,
            files: comparison.files,
        })
    }

    fn persist(&self, tip: &RevisionId) -> Result<(), WatchError> {
        if self.dry_run {
            debug!(%tip, "persist: dry run, cursor not written");
            return Ok(());
        }
        self.store.write(self.target, tip)
    }
}
