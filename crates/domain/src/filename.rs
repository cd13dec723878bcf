//! Collision-safe filename derivation for downloaded notes.

use std::collections::HashSet;

/// Derive a safe filename (with extension) for a note title.
///
/// The title is lower-cased; any run of characters outside `[a-z0-9_.-]`
/// becomes a single hyphen; repeated hyphens collapse; leading/trailing
/// hyphens are trimmed. An empty sanitized title falls back to the note id.
/// While the candidate already exists in `existing_lowercase` (compared
/// case-insensitively), `_<n>` is appended with an incrementing counter
/// starting at 1 and the candidate is re-tested, so an unrelated existing
/// file is never overwritten purely due to a name collision.
#[must_use]
pub fn generate_safe_filename(
    title: &str,
    id: &str,
    extension: &str,
    existing_lowercase: &HashSet<String>,
) -> String {
    let stem = sanitize(title);
    let stem = if stem.is_empty() { id.to_owned() } else { stem };

    let candidate = format!("{stem}{extension}");
    if !existing_lowercase.contains(&candidate.to_lowercase()) {
        return candidate;
    }

    let mut counter = 1u32;
    loop {
        let candidate = format!("{stem}_{counter}{extension}");
        if !existing_lowercase.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

fn sanitize(title: &str) -> String {
    let mut output = String::with_capacity(title.len());
    let mut previous_was_hyphen = false;

    for ch in title.to_lowercase().chars() {
        let safe = ch.is_ascii_lowercase()
            || ch.is_ascii_digit()
            || ch == '_'
            || ch == '.'
            || ch == '-';
        if safe && ch != '-' {
            output.push(ch);
            previous_was_hyphen = false;
        } else if !previous_was_hyphen {
            output.push('-');
            previous_was_hyphen = true;
        }
    }

    output.trim_matches('-').to_owned()
}
