//! Secret detection and redaction utilities.
//!
//! The remote note store is authenticated with a bearer token that lives in
//! the config file or environment. These helpers keep that token (and
//! anything that smells like one) out of log lines and printed config.

/// Checks if a key/variable name likely refers to a secret.
///
/// Uses case-insensitive pattern matching to detect common secret-related
/// naming conventions.
///
/// # Examples
///
/// ```
/// use notesync_shared::is_secret_key;
///
/// assert!(is_secret_key("NOTESYNC_REMOTE_TOKEN"));
/// assert!(is_secret_key("password"));
/// assert!(!is_secret_key("LOG_LEVEL"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Redacts a value if the key is likely a secret.
///
/// Returns `"[REDACTED]"` for secret keys, or the original value otherwise.
///
/// # Examples
///
/// ```
/// use notesync_shared::redact_if_secret;
///
/// assert_eq!(redact_if_secret("token", "abc123"), "[REDACTED]");
/// assert_eq!(redact_if_secret("notes_dir", "/notes"), "/notes");
/// ```
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_keys_are_detected() {
        assert!(is_secret_key("remote.token"));
        assert!(is_secret_key("API_KEY"));
        assert!(is_secret_key("basic_auth"));
        assert!(!is_secret_key("notes_dir"));
        assert!(!is_secret_key("cache_ttl_secs"));
    }

    #[test]
    fn redaction_preserves_non_secrets() {
        assert_eq!(redact_if_secret("token", "t"), REDACTED);
        assert_eq!(redact_if_secret("path", "/n"), "/n");
    }
}
