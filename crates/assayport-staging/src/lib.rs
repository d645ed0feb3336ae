//! Quota-bounded staging of uploaded run files, one directory per
//! session, with TTL-based garbage collection of abandoned sessions.
//!
//! Uploads land under `<uploads_root>/<identity>/<token>/<name>`, all
//! three caller-supplied segments sanitized to a conservative filename
//! alphabet. Admission enforces two byte ceilings, one over the whole
//! upload root and one over the single session, and a rejected or
//! failed upload never leaves a partial file behind.
//!
//! Quota checks and writes are not atomic against each other: two
//! processes admitting concurrently can together land past a ceiling by
//! at most one upload. Ceilings here are resource guards, not hard
//! accounting, and the next admission sees the true totals.
//!
//! ```no_run
//! use std::time::Duration;
//! use assayport_staging::{Ceilings, StagingArea};
//!
//! # fn main() -> assayport_staging::Result<()> {
//! let staging = StagingArea::new(
//!     "/srv/assayport/uploads",
//!     Ceilings {
//!         root_bytes: 20 * 1024 * 1024 * 1024,
//!         session_bytes: 512 * 1024 * 1024,
//!     },
//! );
//!
//! staging.collect_stale("alice", "sess-42", Duration::from_secs(24 * 3600));
//! staging.stage("alice", "sess-42", "plate1.xlsx", &[0u8; 16])?;
//! for staged in staging.finalize("alice", "sess-42")? {
//!     // hand off to durable storage...
//! }
//! staging.clear("alice", "sess-42")?;
//! # Ok(())
//! # }
//! ```

mod error;
mod quota;
mod sanitize;
mod session;

pub use error::{QuotaScope, Result, StagingError};
pub use quota::{Ceilings, admit, dir_size};
pub use sanitize::sanitize_component;
pub use session::{CollectFailure, CollectReport, StagingArea};
