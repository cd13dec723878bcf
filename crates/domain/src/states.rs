//! Sync phase enumeration and allowed transitions.
//!
//! The orchestrator moves through these phases in a fixed order; every
//! phase can be revisited, and the user can exit to `Done` from anywhere.
//! Transitions are validated against the table below so a bug in the
//! orchestrator loop cannot silently skip a phase.

use serde::{Deserialize, Serialize};

/// One phase of the synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Working-tree cleanliness gate before anything is overwritten.
    GitPrecheck,
    /// Give every local file a remote identity (create / recreate / dedupe).
    EnsureTracked,
    /// Materialize remote-only notes as local files.
    Download,
    /// Overwrite conflicting local files with the remote baseline.
    ConflictSurface,
    /// Review human edits and push resolved versions back.
    ConflictReview,
    /// Terminal state; the remote connection is released.
    Done,
}

impl SyncPhase {
    /// Stable snake_case name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitPrecheck => "git_precheck",
            Self::EnsureTracked => "ensure_tracked",
            Self::Download => "download",
            Self::ConflictSurface => "conflict_surface",
            Self::ConflictReview => "conflict_review",
            Self::Done => "done",
        }
    }
}

/// Allowed `(from, to)` phase transitions.
///
/// `GitPrecheck` and `ConflictReview` loop on themselves (recheck until the
/// working tree is clean, review until zero conflicts remain); every phase
/// may exit straight to `Done` when the user asks to stop.
pub const SYNC_PHASE_TRANSITIONS: &[(SyncPhase, SyncPhase)] = &[
    (SyncPhase::GitPrecheck, SyncPhase::GitPrecheck),
    (SyncPhase::GitPrecheck, SyncPhase::EnsureTracked),
    (SyncPhase::GitPrecheck, SyncPhase::Done),
    (SyncPhase::EnsureTracked, SyncPhase::Download),
    (SyncPhase::EnsureTracked, SyncPhase::Done),
    (SyncPhase::Download, SyncPhase::ConflictSurface),
    (SyncPhase::Download, SyncPhase::Done),
    (SyncPhase::ConflictSurface, SyncPhase::ConflictReview),
    (SyncPhase::ConflictSurface, SyncPhase::Done),
    (SyncPhase::ConflictReview, SyncPhase::ConflictReview),
    (SyncPhase::ConflictReview, SyncPhase::Done),
];

/// Returns true when moving from `from` to `to` is a legal transition.
#[must_use]
pub fn is_allowed_transition(from: SyncPhase, to: SyncPhase) -> bool {
    SYNC_PHASE_TRANSITIONS
        .iter()
        .any(|(source, target)| *source == from && *target == to)
}
