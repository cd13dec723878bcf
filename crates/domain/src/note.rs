//! Note entities shared by the local store and the remote adapter.

use notesync_shared::{ErrorCode, ErrorEnvelope, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, stable note identifier.
///
/// Ids are assigned by the remote store and never minted locally; the local
/// side only carries them through frontmatter. An id uniquely identifies at
/// most one record remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Box<str>);

impl NoteId {
    /// Parse a note id from untrusted input.
    ///
    /// The value is trimmed; empty values are rejected.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "note id must be non-empty",
            ));
        }
        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Borrow the id as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single untyped scalar carried through frontmatter and the remote API.
///
/// Notes have a typed core plus an open map of extra fields. Extras are kept
/// as an explicit sidecar of scalars (not arbitrary dynamic values) and pass
/// through decode/encode verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    String(String),
}

impl ScalarValue {
    /// Render the scalar the way it appears in frontmatter.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::String(value) => value.clone(),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// A note as the remote store sees it (remote truth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// Remote-assigned identifier.
    pub id: NoteId,
    /// Human-facing title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation timestamp, string-formatted.
    pub date: String,
    /// Last-update timestamp, string-formatted.
    pub updated_at: String,
    /// Ordered tag sequence.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication flag.
    #[serde(default)]
    pub published: bool,
    /// Open map of extra scalar fields, passed through opaquely.
    #[serde(flatten)]
    pub extra: BTreeMap<String, ScalarValue>,
}

/// A projection of `NoteRecord` without the body, for lighter listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMetadata {
    /// Remote-assigned identifier.
    pub id: NoteId,
    /// Human-facing title.
    pub title: String,
    /// Creation timestamp, string-formatted.
    pub date: String,
    /// Last-update timestamp, string-formatted.
    pub updated_at: String,
    /// Ordered tag sequence.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication flag.
    #[serde(default)]
    pub published: bool,
}

impl From<&NoteRecord> for NoteMetadata {
    fn from(note: &NoteRecord) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            date: note.date.clone(),
            updated_at: note.updated_at.clone(),
            tags: note.tags.clone(),
            published: note.published,
        }
    }
}

/// A local note not yet known to the remote store (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatableNote {
    /// Human-facing title (falls back to the filename stem).
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation timestamp (falls back to the file modification time).
    pub date: String,
    /// Ordered tag sequence, defaults to empty.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Open map of extra scalar fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, ScalarValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_id_rejects_empty_and_trims() {
        assert!(NoteId::parse("").is_err());
        assert!(NoteId::parse("   ").is_err());
        let id = NoteId::parse(" 42 ").ok().map(|id| id.to_string());
        assert_eq!(id.as_deref(), Some("42"));
    }

    #[test]
    fn note_record_serializes_camel_case_with_flattened_extras() {
        let mut extra = BTreeMap::new();
        extra.insert("source".to_string(), ScalarValue::from("import"));
        let note = NoteRecord {
            id: NoteId::parse("7").expect("note id"),
            title: "Title".to_string(),
            content: "Body".to_string(),
            date: "2024-01-01".to_string(),
            updated_at: "2024-02-01".to_string(),
            tags: vec!["a".to_string()],
            published: true,
            extra,
        };

        let value = serde_json::to_value(&note).unwrap_or_default();
        assert_eq!(value.get("updatedAt").and_then(|v| v.as_str()), Some("2024-02-01"));
        assert_eq!(value.get("source").and_then(|v| v.as_str()), Some("import"));
    }

    #[test]
    fn metadata_projection_drops_content() {
        let note = NoteRecord {
            id: NoteId::parse("7").expect("note id"),
            title: "Title".to_string(),
            content: "Body".to_string(),
            date: "2024-01-01".to_string(),
            updated_at: "2024-02-01".to_string(),
            tags: Vec::new(),
            published: false,
            extra: BTreeMap::new(),
        };

        let metadata = NoteMetadata::from(&note);
        assert_eq!(metadata.id, note.id);
        assert_eq!(metadata.title, "Title");
        let value = serde_json::to_value(&metadata).unwrap_or_default();
        assert!(value.get("content").is_none());
    }

    #[test]
    fn scalar_value_untagged_round_trip() {
        let parsed: ScalarValue = serde_json::from_str("true").unwrap_or(ScalarValue::Int(0));
        assert_eq!(parsed, ScalarValue::Bool(true));

        let parsed: ScalarValue = serde_json::from_str("3").unwrap_or(ScalarValue::Bool(false));
        assert_eq!(parsed, ScalarValue::Int(3));

        let parsed: ScalarValue =
            serde_json::from_str("\"x\"").unwrap_or(ScalarValue::Bool(false));
        assert_eq!(parsed, ScalarValue::from("x"));
    }
}
