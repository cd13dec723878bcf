//! # notesync-config
//!
//! Configuration schema, validation, and normalization logic for the CLI.
//! This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ENV_CACHE_PATH, ENV_CACHE_TTL_SECS, ENV_NOTE_EXTENSION, ENV_NOTES_DIR, ENV_REMOTE_BASE_URL,
    ENV_REMOTE_TIMEOUT_MS, ENV_REMOTE_TOKEN, ENV_VCS_COMMIT_MESSAGE, ENV_VCS_INTERACTIVE_TOOL,
    EnvParseError, SyncEnv, apply_env_overrides,
};
pub use load::{load_sync_config_from_path, load_sync_config_std_env, to_pretty_json};
pub use schema::{
    CURRENT_CONFIG_VERSION, CacheConfig, ConfigSchemaError, NotesConfig, RemoteConfig,
    SyncAppConfig, ValidatedSyncAppConfig, VcsConfig, parse_sync_config_json,
    parse_sync_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
