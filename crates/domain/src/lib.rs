//! # notesync-domain
//!
//! Domain entities and pure algorithms for markdown-note synchronization.
//!
//! This crate contains the core domain model with no infrastructure dependencies:
//!
//! - **Note** - `NoteId`, `NoteRecord`, `NoteMetadata`, `CreatableNote`, `ScalarValue`
//! - **Frontmatter** - delimited-metadata codec (decode/encode round trip)
//! - **Localfile** - resolution of scanned files into notes or creatables
//! - **Filename** - collision-safe filename derivation
//! - **Reconcile** - three-way classification of local vs remote snapshots
//! - **States** - sync phase enumeration and allowed transitions
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate (plus serde / serde_yaml_ng)
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use notesync_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod filename;
pub mod frontmatter;
pub mod localfile;
pub mod note;
pub mod reconcile;
pub mod states;

pub use filename::generate_safe_filename;
pub use frontmatter::{FRONTMATTER_DELIMITER, Frontmatter, decode, encode};
pub use localfile::{LocalNoteFile, extract_creatable, resolve_note};
pub use note::{CreatableNote, NoteId, NoteMetadata, NoteRecord, ScalarValue};
pub use reconcile::{LocalResolvedNote, SyncUnit, classify, field_diffs};
pub use states::{SYNC_PHASE_TRANSITIONS, SyncPhase, is_allowed_transition};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
