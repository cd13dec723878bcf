//! Resolution of scanned local files into notes or creatables.
//!
//! A scanned file resolves into a full note only when its frontmatter
//! carries a non-empty `id`, a creation timestamp (`date` or `createdAt`),
//! and `updatedAt`. A file whose frontmatter has no `id` at all is a
//! *creatable*: a note the remote store does not know yet. Anything else
//! (for example an empty-string id) is invalid and gets skipped by the
//! caller, never deleted.

use crate::frontmatter::Frontmatter;
use crate::note::{CreatableNote, NoteId, NoteRecord, ScalarValue};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A markdown file as found on disk, after frontmatter decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalNoteFile {
    /// Absolute file path; unique key within one scan.
    pub path: PathBuf,
    /// Decoded frontmatter mapping, if the file had a well-formed block.
    pub frontmatter: Option<Frontmatter>,
    /// Raw text after the frontmatter block (the whole file when absent).
    pub body: String,
}

impl LocalNoteFile {
    /// The filename stem, the durable human-facing identifier on disk.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }
}

/// Resolve a scanned file into a full note, or `None` when required
/// frontmatter fields (`id`, `date`/`createdAt`, `updatedAt`) are missing.
#[must_use]
pub fn resolve_note(file: &LocalNoteFile) -> Option<NoteRecord> {
    let frontmatter = file.frontmatter.as_ref()?;

    let id = scalar_string(frontmatter.get("id")?)?;
    let id = NoteId::parse(id).ok()?;
    let date = created_at(frontmatter)?;
    let updated_at = scalar_string(frontmatter.get("updatedAt")?)?;

    Some(NoteRecord {
        id,
        title: title_or_stem(frontmatter, &file.path),
        content: file.body.clone(),
        date,
        updated_at,
        tags: tags_of(frontmatter),
        published: published_of(frontmatter),
        extra: extras_of(frontmatter),
    })
}

/// Extract a creatable note from a file whose frontmatter has no `id`.
///
/// `modified` is the file's modification time, already string-formatted by
/// the caller; it backs the `date` field when frontmatter has none.
#[must_use]
pub fn extract_creatable(file: &LocalNoteFile, modified: &str) -> Option<CreatableNote> {
    if let Some(frontmatter) = file.frontmatter.as_ref() {
        if frontmatter.contains_key("id") {
            return None;
        }
    }

    let empty = Frontmatter::new();
    let frontmatter = file.frontmatter.as_ref().unwrap_or(&empty);

    let date = created_at(frontmatter).unwrap_or_else(|| modified.to_owned());

    Some(CreatableNote {
        title: title_or_stem(frontmatter, &file.path),
        content: file.body.clone(),
        date,
        tags: tags_of(frontmatter),
        extra: extras_of(frontmatter),
    })
}

fn title_or_stem(frontmatter: &Frontmatter, path: &Path) -> String {
    frontmatter
        .get("title")
        .and_then(scalar_string)
        .unwrap_or_else(|| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_owned()
        })
}

fn created_at(frontmatter: &Frontmatter) -> Option<String> {
    frontmatter
        .get("date")
        .or_else(|| frontmatter.get("createdAt"))
        .and_then(scalar_string)
}

fn tags_of(frontmatter: &Frontmatter) -> Vec<String> {
    match frontmatter.get("tags") {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        _ => Vec::new(),
    }
}

fn published_of(frontmatter: &Frontmatter) -> bool {
    matches!(frontmatter.get("published"), Some(Value::Bool(true)))
}

const RECOGNIZED_KEYS: &[&str] = &[
    "id",
    "title",
    "date",
    "createdAt",
    "updatedAt",
    "tags",
    "published",
];

fn extras_of(frontmatter: &Frontmatter) -> BTreeMap<String, ScalarValue> {
    frontmatter
        .iter()
        .filter(|(key, _)| !RECOGNIZED_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| scalar_value(value).map(|value| (key.clone(), value)))
        .collect()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
    }
}

fn scalar_value(value: &Value) -> Option<ScalarValue> {
    match value {
        Value::Bool(value) => Some(ScalarValue::Bool(*value)),
        Value::Number(value) => value.as_i64().map_or_else(
            || value.as_f64().map(ScalarValue::Float),
            |value| Some(ScalarValue::Int(value)),
        ),
        Value::String(value) => Some(ScalarValue::String(value.clone())),
        _ => None,
    }
}
