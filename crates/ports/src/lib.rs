//! # notesync-ports
//!
//! Port traits for the notesync hexagonal architecture.
//!
//! This crate defines the interfaces between the sync core and
//! infrastructure: the remote note store, the notes directory on disk, the
//! interactive decision source, the version-control collaborator, and
//! structured logging. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// Boundary work here is I/O-bound and strictly sequential, so boxed
/// futures keep the traits object-safe without costing anything that
/// matters.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod decision;
pub mod filesystem;
pub mod logger;
pub mod remote;
pub mod vcs;

pub use decision::*;
pub use filesystem::*;
pub use logger::*;
pub use remote::*;
pub use vcs::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `notesync-domain`.
pub use notesync_domain::{CreatableNote, NoteId, NoteMetadata, NoteRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_domain::domain_crate_version;
    use notesync_shared::shared_crate_version;

    #[test]
    fn ports_crate_compiles() {
        let version = ports_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
