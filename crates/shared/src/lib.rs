//! # notesync-shared
//!
//! Shared utilities, result types, and error handling for the notesync
//! workspace.
//!
//! This crate provides foundational types that are used across all other
//! crates:
//!
//! - Result and error envelope types
//! - Request-scoped context and cancellation
//! - Secret redaction helpers for logging and config printing
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - All public error types support serialization

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod concurrency;
pub mod errors;
pub mod redaction;
pub mod result;

pub use concurrency::{CancellationToken, CorrelationId, RequestContext};
pub use errors::{
    ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, REDACTED_VALUE,
};
pub use redaction::{REDACTED, is_secret_key, redact_if_secret};
pub use result::{NoteContextExt, Result};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
