//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is:
//! - strict (invalid values fail fast)
//! - deterministic (overrides apply after the file layer)
//! - safe (secret values are redacted in error metadata)

use crate::schema::{SyncAppConfig, ValidatedSyncAppConfig};
use notesync_shared::{ErrorCode, ErrorEnvelope, REDACTED, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: notes directory.
pub const ENV_NOTES_DIR: &str = "NOTESYNC_NOTES_DIR";
/// Env var: note file extension (with leading dot).
pub const ENV_NOTE_EXTENSION: &str = "NOTESYNC_NOTE_EXTENSION";
/// Env var: remote store base URL.
pub const ENV_REMOTE_BASE_URL: &str = "NOTESYNC_REMOTE_BASE_URL";
/// Env var: remote store bearer token (secret).
// gitleaks:allow
pub const ENV_REMOTE_TOKEN: &str = "NOTESYNC_REMOTE_TOKEN";
/// Env var: remote request timeout in milliseconds.
pub const ENV_REMOTE_TIMEOUT_MS: &str = "NOTESYNC_REMOTE_TIMEOUT_MS";
/// Env var: commit message for pending-change commits.
pub const ENV_VCS_COMMIT_MESSAGE: &str = "NOTESYNC_VCS_COMMIT_MESSAGE";
/// Env var: interactive tool opened during conflict review.
pub const ENV_VCS_INTERACTIVE_TOOL: &str = "NOTESYNC_VCS_INTERACTIVE_TOOL";
/// Env var: metadata cache file path.
pub const ENV_CACHE_PATH: &str = "NOTESYNC_CACHE_PATH";
/// Env var: metadata cache freshness window in seconds.
pub const ENV_CACHE_TTL_SECS: &str = "NOTESYNC_CACHE_TTL_SECS";

/// Typed env-derived overrides for `SyncAppConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncEnv {
    /// Override for `notes.dir`.
    pub notes_dir: Option<Box<str>>,
    /// Override for `notes.extension`.
    pub note_extension: Option<Box<str>>,
    /// Override for `remote.baseUrl`.
    pub remote_base_url: Option<Box<str>>,
    /// Override for `remote.token`.
    pub remote_token: Option<Box<str>>,
    /// Override for `remote.timeoutMs`.
    pub remote_timeout_ms: Option<u64>,
    /// Override for `vcs.commitMessage`.
    pub vcs_commit_message: Option<Box<str>>,
    /// Override for `vcs.interactiveTool`.
    pub vcs_interactive_tool: Option<Box<str>>,
    /// Override for `cache.path`.
    pub cache_path: Option<Box<str>>,
    /// Override for `cache.ttlSecs`.
    pub cache_ttl_secs: Option<u64>,
}

impl SyncEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            notes_dir: parse_optional_trimmed_string(map, ENV_NOTES_DIR),
            note_extension: parse_optional_trimmed_string(map, ENV_NOTE_EXTENSION),
            remote_base_url: parse_optional_trimmed_string(map, ENV_REMOTE_BASE_URL),
            remote_token: parse_optional_trimmed_string(map, ENV_REMOTE_TOKEN),
            remote_timeout_ms: parse_optional_u64(map, ENV_REMOTE_TIMEOUT_MS)?,
            vcs_commit_message: parse_optional_trimmed_string(map, ENV_VCS_COMMIT_MESSAGE),
            vcs_interactive_tool: parse_optional_trimmed_string(map, ENV_VCS_INTERACTIVE_TOOL),
            cache_path: parse_optional_trimmed_string(map, ENV_CACHE_PATH),
            cache_ttl_secs: parse_optional_u64(map, ENV_CACHE_TTL_SECS)?,
        })
    }

    /// Parse env overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in [
            ENV_NOTES_DIR,
            ENV_NOTE_EXTENSION,
            ENV_REMOTE_BASE_URL,
            ENV_REMOTE_TOKEN,
            ENV_REMOTE_TIMEOUT_MS,
            ENV_VCS_COMMIT_MESSAGE,
            ENV_VCS_INTERACTIVE_TOOL,
            ENV_CACHE_PATH,
            ENV_CACHE_TTL_SECS,
        ] {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_owned(), value);
            }
        }
        Self::from_map(&map)
    }
}

/// Apply env overrides on top of a config, then validate and normalize.
pub fn apply_env_overrides(
    mut config: SyncAppConfig,
    env: &SyncEnv,
) -> Result<ValidatedSyncAppConfig, ErrorEnvelope> {
    if let Some(dir) = env.notes_dir.as_deref() {
        config.notes.dir = dir.into();
    }
    if let Some(extension) = env.note_extension.as_deref() {
        config.notes.extension = extension.into();
    }
    if let Some(base_url) = env.remote_base_url.as_deref() {
        config.remote.base_url = Some(base_url.into());
    }
    if let Some(token) = env.remote_token.as_deref() {
        config.remote.token = Some(token.into());
    }
    if let Some(timeout_ms) = env.remote_timeout_ms {
        config.remote.timeout_ms = timeout_ms;
    }
    if let Some(message) = env.vcs_commit_message.as_deref() {
        config.vcs.commit_message = message.into();
    }
    if let Some(tool) = env.vcs_interactive_tool.as_deref() {
        config.vcs.interactive_tool = tool.into();
    }
    if let Some(path) = env.cache_path.as_deref() {
        config.cache.path = Some(path.into());
    }
    if let Some(ttl_secs) = env.cache_ttl_secs {
        config.cache.ttl_secs = ttl_secs;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Typed env parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// A numeric env var did not parse as an unsigned integer.
    InvalidNumber {
        /// Env var name.
        name: &'static str,
        /// Raw value (redacted for secret-looking names).
        value: String,
    },
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber { name, value } => {
                write!(formatter, "{name} must be an unsigned integer (got {value})")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        match error {
            EnvParseError::InvalidNumber { name, value } => {
                Self::expected(ErrorCode::new("config", "invalid_env"), error_message(name))
                    .with_metadata("name", name)
                    .with_metadata("value", value)
            },
        }
    }
}

fn error_message(name: &str) -> String {
    format!("invalid value for env var {name}")
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    name: &'static str,
) -> Option<Box<str>> {
    map.get(name).map(|value| value.trim()).and_then(|value| {
        if value.is_empty() {
            None
        } else {
            Some(value.to_owned().into_boxed_str())
        }
    })
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    name: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    match map.get(name) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|_| EnvParseError::InvalidNumber {
                    name,
                    value: if is_secret_key(name) {
                        REDACTED.to_owned()
                    } else {
                        trimmed.to_owned()
                    },
                })
        },
    }
}
