//! Directory size accounting and quota admission.
//!
//! Two independent ceilings govern uploads: one over the whole upload
//! root (every identity's sessions) and one over the caller's single
//! session directory. Both are checked additively - existing size plus
//! the incoming file - before anything is written.
//!
//! The size check and the subsequent write are not atomic as a pair: two
//! concurrent uploads can each pass admission and jointly exceed a
//! ceiling. That is an accepted property of the request-scoped model,
//! not a bug; the ceilings bound steady-state usage, not a worst-case
//! race window.

use std::path::Path;

use crate::error::{QuotaScope, Result, StagingError};

/// Maximum recursion depth for directory-size traversal.
const MAX_TRAVERSAL_DEPTH: usize = 64;

/// The two byte-size ceilings, in the same unit.
#[derive(Debug, Clone, Copy)]
pub struct Ceilings {
    /// Ceiling over the whole upload root.
    pub root_bytes: u64,
    /// Ceiling over one session directory.
    pub session_bytes: u64,
}

/// Compute the aggregate size of a directory tree, in bytes.
///
/// A missing directory has size zero. Unreadable entries are skipped;
/// the result is an estimate for admission, not an audit.
pub fn dir_size(path: &Path) -> u64 {
    let mut total = 0u64;
    let mut stack = vec![(path.to_path_buf(), 0usize)];

    while let Some((current, depth)) = stack.pop() {
        if depth >= MAX_TRAVERSAL_DEPTH {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            let entry_path = entry.path();
            let Ok(metadata) = entry_path.symlink_metadata() else {
                continue;
            };
            if metadata.is_file() {
                total = total.saturating_add(metadata.len());
            } else if metadata.is_dir() {
                stack.push((entry_path, depth + 1));
            }
        }
    }

    total
}

/// Decide whether an incoming file of `incoming_bytes` may be written.
///
/// The session ceiling is checked first so the violation most actionable
/// for the caller is the one reported. Ceilings are exclusive upper
/// bounds: a cumulative total exactly at the ceiling is rejected.
/// On rejection the caller must discard the file without writing it.
pub fn admit(
    root: &Path,
    session_dir: &Path,
    incoming_bytes: u64,
    ceilings: &Ceilings,
) -> Result<()> {
    let session_total = dir_size(session_dir).saturating_add(incoming_bytes);
    if session_total >= ceilings.session_bytes {
        return Err(StagingError::QuotaExceeded {
            scope: QuotaScope::Session,
            ceiling_bytes: ceilings.session_bytes,
        });
    }

    let root_total = dir_size(root).saturating_add(incoming_bytes);
    if root_total >= ceilings.root_bytes {
        return Err(StagingError::QuotaExceeded {
            scope: QuotaScope::Root,
            ceiling_bytes: ceilings.root_bytes,
        });
    }

    Ok(())
}
