//! Frontmatter codec: a delimited metadata block plus a body.
//!
//! A note file starts with a line that, trimmed, equals `---`; the block
//! runs until the next such line. Everything between the delimiters is a
//! YAML mapping, everything after the closing delimiter is the raw body.
//!
//! Decoding is forgiving by construction: a missing opening delimiter, an
//! unterminated block, a parse error, or a non-mapping parse result all
//! yield no frontmatter and the *entire original text* as body, so a
//! malformed file is never silently truncated on a later rewrite.

use crate::note::NoteRecord;
use serde_yaml_ng::{Mapping, Value};
use std::collections::BTreeMap;

/// The frontmatter block delimiter.
pub const FRONTMATTER_DELIMITER: &str = "---";

/// A decoded frontmatter mapping, keyed by field name.
pub type Frontmatter = BTreeMap<String, Value>;

/// Decode a note file into its frontmatter mapping and body.
///
/// Returns `(None, original_text)` when no well-formed frontmatter block is
/// present (see module docs for the degradation rules).
#[must_use]
pub fn decode(content: &str) -> (Option<Frontmatter>, String) {
    let mut segments = content.split_inclusive('\n');

    let Some(first_line) = segments.next() else {
        return (None, content.to_owned());
    };
    if first_line.trim() != FRONTMATTER_DELIMITER {
        return (None, content.to_owned());
    }

    let block_start = first_line.len();
    let mut cursor = block_start;
    let mut closing: Option<(usize, usize)> = None;

    for line in segments {
        if line.trim() == FRONTMATTER_DELIMITER {
            closing = Some((cursor, cursor + line.len()));
            break;
        }
        cursor += line.len();
    }

    let Some((block_end, body_start)) = closing else {
        // No closing delimiter: treat the file as having no metadata at all.
        return (None, content.to_owned());
    };

    let block = content.get(block_start..block_end).unwrap_or_default();
    let body = content.get(body_start..).unwrap_or_default();

    match serde_yaml_ng::from_str::<Value>(block) {
        Ok(Value::Mapping(mapping)) => (Some(mapping_to_frontmatter(mapping)), body.to_owned()),
        Ok(_) | Err(_) => (None, content.to_owned()),
    }
}

/// Encode a note as a frontmatter block followed by its body.
///
/// Every field except `content` lands in the block, in a stable order:
/// `id`, `title`, `date`, `updatedAt`, `tags`, `published`, then extras
/// sorted by key. `decode(encode(n))` reproduces all of those fields and
/// returns `n.content` as body.
#[must_use]
pub fn encode(note: &NoteRecord) -> String {
    let mut mapping = Mapping::new();
    mapping.insert(
        Value::String("id".to_owned()),
        Value::String(note.id.as_str().to_owned()),
    );
    mapping.insert(
        Value::String("title".to_owned()),
        Value::String(note.title.clone()),
    );
    mapping.insert(
        Value::String("date".to_owned()),
        Value::String(note.date.clone()),
    );
    mapping.insert(
        Value::String("updatedAt".to_owned()),
        Value::String(note.updated_at.clone()),
    );
    mapping.insert(
        Value::String("tags".to_owned()),
        Value::Sequence(
            note.tags
                .iter()
                .map(|tag| Value::String(tag.clone()))
                .collect(),
        ),
    );
    mapping.insert(
        Value::String("published".to_owned()),
        Value::Bool(note.published),
    );
    for (key, value) in &note.extra {
        mapping.insert(
            Value::String(key.clone()),
            scalar_to_yaml(value),
        );
    }

    let block = serde_yaml_ng::to_string(&mapping).unwrap_or_default();
    format!("{FRONTMATTER_DELIMITER}\n{block}{FRONTMATTER_DELIMITER}\n{}", note.content)
}

fn mapping_to_frontmatter(mapping: Mapping) -> Frontmatter {
    let mut fields = Frontmatter::new();
    for (key, value) in mapping {
        let key = match key {
            Value::String(key) => key,
            other => serde_yaml_ng::to_string(&other)
                .unwrap_or_default()
                .trim_end()
                .to_owned(),
        };
        fields.insert(key, value);
    }
    fields
}

fn scalar_to_yaml(value: &crate::note::ScalarValue) -> Value {
    match value {
        crate::note::ScalarValue::Bool(value) => Value::Bool(*value),
        crate::note::ScalarValue::Int(value) => Value::Number((*value).into()),
        crate::note::ScalarValue::Float(value) => Value::Number((*value).into()),
        crate::note::ScalarValue::String(value) => Value::String(value.clone()),
    }
}
