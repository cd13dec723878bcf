//! # notesync-app
//!
//! Application use cases for markdown-note synchronization.
//!
//! Use cases operate purely over the port traits in `notesync-ports`; the
//! composition root (the CLI) constructs concrete adapters and injects them
//! here. Nothing in this crate touches I/O directly.
//!
//! - **`local_store`** - scan a notes directory into a point-in-time snapshot
//! - **`sync_notes`** - the interactive synchronization state machine
//! - **`status`** - one read-only reconciliation sweep, summarized

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod local_store;
pub mod status;
pub mod sync_notes;

#[cfg(test)]
pub(crate) mod testing;

pub use local_store::{CreatableCandidate, LocalSnapshot, scan_local_notes, write_note};
pub use status::{ConflictSummary, StatusDeps, StatusInput, StatusReport, status};
pub use sync_notes::{SyncDeps, SyncInput, SyncOutput, SyncStatus, sync_notes};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #[test]
    fn app_crate_compiles() {
        assert!(!super::app_crate_version().is_empty());
    }
}
