//! # notesync-adapters
//!
//! Adapter implementations for ports (notes filesystem, remote HTTP store,
//! git, terminal prompts, logging). This crate depends on `ports`, `config`,
//! `domain`, and `shared`.

pub mod cache;
pub mod fs;
pub mod log_sink;
pub mod logger;
pub mod remote;
pub mod terminal;
pub mod vcs;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
