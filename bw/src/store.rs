//! Persisted cursor per watch target
//!
//! Layout:
//!
//! ```text
//! tracking/
//! ├── foodme-app_dev.sha     # raw revision id, or "initial"
//! ├── foodme-app_main.sha
//! └── foodme-app_feature%2Flogin.sha   # repo and branch percent-encoded
//! ```

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::{RevisionId, WatchTarget};
use crate::error::WatchError;

/// File content meaning "never observed"
const UNINITIALIZED: &str = "initial";

/// Extension of cursor files
const CURSOR_EXT: &str = "sha";

/// Escaped in file name components: path separators, the `_` joining repo and
/// branch, and `%` itself so the mapping stays reversible
const FILE_COMPONENT: &AsciiSet = &CONTROLS.add(b'%').add(b'/').add(b'\\').add(b'_');

/// File-backed cursor store, one small text file per (repository, branch)
#[derive(Debug, Clone)]
pub struct CursorStore {
    base_path: PathBuf,
}

impl CursorStore {
    /// Create a store rooted at the tracking directory (created lazily on first write)
    pub fn new(path: impl AsRef<Path>) -> Self {
        let base_path = path.as_ref().to_path_buf();
        debug!(?base_path, "CursorStore::new: called");
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Location of the cursor file for a target
    ///
    /// `feature/login` and `feature-login` map to different files.
    pub fn cursor_path(&self, target: &WatchTarget) -> PathBuf {
        let name = format!(
            "{}_{}.{}",
            utf8_percent_encode(&target.repo, FILE_COMPONENT),
            utf8_percent_encode(&target.branch, FILE_COMPONENT),
            CURSOR_EXT
        );
        self.base_path.join(name)
    }

    /// Read the last observed revision, `None` if the target was never observed
    pub fn read(&self, target: &WatchTarget) -> Result<Option<RevisionId>, WatchError> {
        let path = self.cursor_path(target);
        debug!(?path, "CursorStore::read: called");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("CursorStore::read: no cursor file");
                return Ok(None);
            }
            Err(source) => return Err(WatchError::Storage { path, source }),
        };

        let value = content.trim();
        if value.is_empty() || value == UNINITIALIZED {
            debug!(%value, "CursorStore::read: cursor not initialized");
            return Ok(None);
        }

        Ok(Some(RevisionId::new(value)))
    }

    /// Atomically replace the stored revision
    ///
    /// Writes a temp file in the tracking directory and renames it over the
    /// cursor, so readers see either the old value or the new one.
    pub fn write(&self, target: &WatchTarget, revision: &RevisionId) -> Result<(), WatchError> {
        let path = self.cursor_path(target);
        debug!(?path, %revision, "CursorStore::write: called");

        let storage_err = |source: std::io::Error| WatchError::Storage {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.base_path).map_err(storage_err)?;

        let mut tmp = NamedTempFile::new_in(&self.base_path).map_err(storage_err)?;
        tmp.write_all(revision.as_str().as_bytes()).map_err(storage_err)?;
        tmp.as_file().sync_all().map_err(storage_err)?;
        tmp.persist(&path).map_err(|e| storage_err(e.error))?;

        info!(watch = %target, revision = %revision.short(), "Saved cursor");
        Ok(())
    }

    /// Forget the cursor so the next run is treated as a first run
    pub fn clear(&self, target: &WatchTarget) -> Result<bool, WatchError> {
        let path = self.cursor_path(target);
        debug!(?path, "CursorStore::clear: called");

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(watch = %target, "Cleared cursor");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(WatchError::Storage { path, source }),
        }
    }
}
