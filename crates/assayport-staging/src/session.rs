//! Session staging directories and their lifecycle.
//!
//! Every session owns exactly one staging directory at
//! `<uploads_root>/<identity>/<token>/`, created implicitly on first
//! upload and destroyed by an explicit clear, by hand-off, or by
//! garbage collection once it outlives the TTL. Both path segments are
//! sanitized before use; the token is caller-supplied.
//!
//! A session moves `absent -> staging -> {cleared | finalized-and-cleared
//! | expired-and-collected}`. Every terminal transition is a deletion; a
//! new upload under a cleared token starts a fresh cycle.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{Result, StagingError};
use crate::quota::{Ceilings, admit};
use crate::sanitize::sanitize_component;

/// The upload root and its quota ceilings.
#[derive(Debug, Clone)]
pub struct StagingArea {
    uploads_root: PathBuf,
    ceilings: Ceilings,
}

/// Outcome of one garbage-collection sweep.
///
/// Collection is best-effort: a failure deleting one session is recorded
/// here and never aborts the rest of the sweep.
#[derive(Debug, Default)]
pub struct CollectReport {
    /// Session directories that were deleted.
    pub removed: Vec<PathBuf>,
    /// Session directories that could not be deleted, with the cause.
    pub failures: Vec<CollectFailure>,
}

/// One failed deletion during a garbage-collection sweep.
#[derive(Debug)]
pub struct CollectFailure {
    /// The session directory that could not be deleted.
    pub path: PathBuf,
    /// The underlying I/O error.
    pub error: std::io::Error,
}

impl StagingArea {
    /// Create a staging area rooted at `uploads_root`.
    pub fn new(uploads_root: impl Into<PathBuf>, ceilings: Ceilings) -> Self {
        StagingArea {
            uploads_root: uploads_root.into(),
            ceilings,
        }
    }

    /// The upload root shared by every identity.
    pub fn uploads_root(&self) -> &Path {
        &self.uploads_root
    }

    /// The staging directory for one (identity, token) pair.
    ///
    /// Both segments are sanitized; the directory may not exist yet.
    pub fn session_dir(&self, identity: &str, token: &str) -> PathBuf {
        self.uploads_root
            .join(sanitize_component(identity))
            .join(sanitize_component(token))
    }

    /// Stage one uploaded file into the session.
    ///
    /// Ensures the staging directory exists (creating an already-existing
    /// directory is not an error, so concurrent first-writers are fine),
    /// checks both quota ceilings, and writes the file under its sanitized
    /// name. A prior file of the same sanitized name is overwritten, which
    /// makes re-uploads idempotent. On rejection or I/O failure nothing
    /// partial is left behind: the bytes go to a temporary file that is
    /// renamed into place only once fully written.
    pub fn stage(
        &self,
        identity: &str,
        token: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let session_dir = self.session_dir(identity, token);
        std::fs::create_dir_all(&session_dir)
            .map_err(|e| StagingError::io(format!("creating {}", session_dir.display()), e))?;

        admit(
            &self.uploads_root,
            &session_dir,
            bytes.len() as u64,
            &self.ceilings,
        )?;

        let final_path = session_dir.join(sanitize_component(filename));
        let mut staged = tempfile::NamedTempFile::new_in(&session_dir).map_err(|e| {
            StagingError::io(format!("creating temp file in {}", session_dir.display()), e)
        })?;
        staged
            .write_all(bytes)
            .map_err(|e| StagingError::io(format!("writing {}", final_path.display()), e))?;
        staged
            .persist(&final_path)
            .map_err(|e| StagingError::io(format!("moving into {}", final_path.display()), e.error))?;

        tracing::debug!(path = %final_path.display(), bytes = bytes.len(), "staged upload");
        Ok(final_path)
    }

    /// Delete the identity's stale sessions, sparing `except_token`.
    ///
    /// A session is stale once its directory's last-modified time is older
    /// than `ttl`. The caller's own current session is never touched,
    /// regardless of age.
    pub fn collect_stale(&self, identity: &str, except_token: &str, ttl: Duration) -> CollectReport {
        self.collect_stale_at(identity, except_token, ttl, SystemTime::now())
    }

    /// [`collect_stale`](Self::collect_stale) against an explicit clock.
    pub fn collect_stale_at(
        &self,
        identity: &str,
        except_token: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> CollectReport {
        let mut report = CollectReport::default();
        let identity_root = self.uploads_root.join(sanitize_component(identity));
        let keep = sanitize_component(except_token);

        let entries = match std::fs::read_dir(&identity_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return report,
            Err(error) => {
                report.failures.push(CollectFailure {
                    path: identity_root,
                    error,
                });
                return report;
            }
        };

        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            let path = entry.path();
            if path.file_name() == Some(OsStr::new(&keep)) {
                continue;
            }
            if !path.is_dir() || !is_stale(&path, ttl, now) {
                continue;
            }
            match std::fs::remove_dir_all(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "collected stale session");
                    report.removed.push(path);
                }
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        "failed to collect stale session: {error}"
                    );
                    report.failures.push(CollectFailure { path, error });
                }
            }
        }

        report
    }

    /// The session's staged files, sorted by name, without deleting them.
    ///
    /// Used immediately before hand-off to durable storage; deletion is a
    /// separate explicit [`clear`](Self::clear) after the caller confirms
    /// the hand-off succeeded, so a failed hand-off leaves the files
    /// recoverable. A session that was never staged yields an empty list.
    pub fn finalize(&self, identity: &str, token: &str) -> Result<Vec<PathBuf>> {
        let session_dir = self.session_dir(identity, token);
        let entries = match std::fs::read_dir(&session_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StagingError::io(
                    format!("reading {}", session_dir.display()),
                    e,
                ));
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StagingError::io(format!("reading {}", session_dir.display()), e)
            })?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Delete the session's files and its directory.
    ///
    /// Idempotent: clearing a session that does not exist succeeds.
    pub fn clear(&self, identity: &str, token: &str) -> Result<()> {
        let session_dir = self.session_dir(identity, token);
        match std::fs::remove_dir_all(&session_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StagingError::io(
                format!("clearing {}", session_dir.display()),
                e,
            )),
        }
    }
}

fn is_stale(path: &Path, ttl: Duration, now: SystemTime) -> bool {
    let Ok(metadata) = path.symlink_metadata() else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    match now.duration_since(modified) {
        Ok(age) => age > ttl,
        Err(_) => false,
    }
}
