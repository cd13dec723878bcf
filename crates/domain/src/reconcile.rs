//! Three-way classification of local and remote note snapshots.
//!
//! `classify` is a pure function over two fully materialized snapshots: it
//! never touches I/O, keeps no state, and is safe to re-run after every
//! mutation. Which side "wins" a conflict is not decided here; every
//! matched pair with differing fields is surfaced for the orchestrator to
//! resolve through explicit decisions.

use crate::note::NoteRecord;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A local file that resolved into a full note, paired with its path.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalResolvedNote {
    /// Absolute path of the backing file.
    pub path: PathBuf,
    /// The resolved note.
    pub note: NoteRecord,
}

/// The per-id pairing produced by one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUnit {
    /// The id exists locally but not remotely.
    LocalOnly {
        /// Path of the local file.
        path: PathBuf,
        /// The locally resolved note.
        note: NoteRecord,
    },
    /// The id exists remotely but not locally.
    RemoteOnly {
        /// The remote record.
        note: NoteRecord,
    },
    /// The id exists on both sides.
    Matched {
        /// Path of the local file.
        path: PathBuf,
        /// The locally resolved note.
        local: NoteRecord,
        /// The remote record.
        remote: NoteRecord,
        /// Names of fields whose values differ; empty means in sync.
        field_diffs: Vec<String>,
    },
}

impl SyncUnit {
    /// Returns true for a matched unit with at least one differing field.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Matched { field_diffs, .. } if !field_diffs.is_empty())
    }
}

/// Classify two snapshots into disjoint `LocalOnly` / `RemoteOnly` /
/// `Matched` units, ordered by note id.
///
/// An id present in neither snapshot never appears in the output; running
/// the function twice over the same snapshots yields identical results.
#[must_use]
pub fn classify(locals: &[LocalResolvedNote], remotes: &[NoteRecord]) -> Vec<SyncUnit> {
    let mut local_by_id: BTreeMap<&str, &LocalResolvedNote> = BTreeMap::new();
    for local in locals {
        local_by_id.insert(local.note.id.as_str(), local);
    }

    let mut remote_by_id: BTreeMap<&str, &NoteRecord> = BTreeMap::new();
    for remote in remotes {
        remote_by_id.insert(remote.id.as_str(), remote);
    }

    let mut ids: Vec<&str> = local_by_id.keys().copied().collect();
    for id in remote_by_id.keys() {
        if !local_by_id.contains_key(id) {
            ids.push(id);
        }
    }
    ids.sort_unstable();

    let mut units = Vec::with_capacity(ids.len());
    for id in ids {
        match (local_by_id.get(id), remote_by_id.get(id)) {
            (Some(local), Some(remote)) => units.push(SyncUnit::Matched {
                path: local.path.clone(),
                local: local.note.clone(),
                remote: (*remote).clone(),
                field_diffs: field_diffs(&local.note, remote),
            }),
            (Some(local), None) => units.push(SyncUnit::LocalOnly {
                path: local.path.clone(),
                note: local.note.clone(),
            }),
            (None, Some(remote)) => units.push(SyncUnit::RemoteOnly {
                note: (*remote).clone(),
            }),
            (None, None) => {}
        }
    }
    units
}

/// Compare a matched local/remote pair field by field.
///
/// `title`, `date`, `content` (the local body with frontmatter already
/// stripped, against the remote content verbatim), and `published` use
/// strict equality. `tags` are compared as order-sensitive sequences: the
/// same tags in a different order count as a difference. Extra scalar
/// fields present on either side are compared by strict value equality;
/// `id` and `updatedAt` are excluded.
#[must_use]
pub fn field_diffs(local: &NoteRecord, remote: &NoteRecord) -> Vec<String> {
    let mut diffs = Vec::new();

    if local.title != remote.title {
        diffs.push("title".to_owned());
    }
    if local.date != remote.date {
        diffs.push("date".to_owned());
    }
    if local.content != remote.content {
        diffs.push("content".to_owned());
    }
    // Order-sensitive on purpose: ["a","b"] vs ["b","a"] is a conflict.
    if local.tags != remote.tags {
        diffs.push("tags".to_owned());
    }
    if local.published != remote.published {
        diffs.push("published".to_owned());
    }

    let mut extra_keys: Vec<&String> = local.extra.keys().collect();
    for key in remote.extra.keys() {
        if !local.extra.contains_key(key) {
            extra_keys.push(key);
        }
    }
    extra_keys.sort_unstable();
    for key in extra_keys {
        if local.extra.get(key) != remote.extra.get(key) {
            diffs.push(key.clone());
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{NoteId, ScalarValue};
    use std::collections::BTreeMap;

    fn note(id: &str, title: &str) -> NoteRecord {
        NoteRecord {
            id: NoteId::parse(id).expect("note id"),
            title: title.to_string(),
            content: String::new(),
            date: "2024-01-01".to_string(),
            updated_at: "2024-01-01".to_string(),
            tags: Vec::new(),
            published: false,
            extra: BTreeMap::new(),
        }
    }

    fn local(id: &str, title: &str) -> LocalResolvedNote {
        LocalResolvedNote {
            path: PathBuf::from(format!("/notes/{id}.md")),
            note: note(id, title),
        }
    }

    #[test]
    fn partitions_ids_into_three_disjoint_categories() {
        let locals = vec![local("1", "only local"), local("2", "both")];
        let remotes = vec![note("2", "both"), note("3", "only remote")];

        let units = classify(&locals, &remotes);
        assert_eq!(units.len(), 3);
        assert!(matches!(
            units.first(),
            Some(SyncUnit::LocalOnly { note, .. }) if note.id.as_str() == "1"
        ));
        assert!(matches!(
            units.get(1),
            Some(SyncUnit::Matched { field_diffs, .. }) if field_diffs.is_empty()
        ));
        assert!(matches!(
            units.get(2),
            Some(SyncUnit::RemoteOnly { note }) if note.id.as_str() == "3"
        ));
    }

    #[test]
    fn classify_is_idempotent() {
        let locals = vec![local("1", "a"), local("2", "b")];
        let remotes = vec![note("2", "b2"), note("3", "c")];

        let first = classify(&locals, &remotes);
        let second = classify(&locals, &remotes);
        assert_eq!(first, second);
    }

    #[test]
    fn title_difference_is_a_conflict() {
        // Local {id 5, title Old} vs remote {id 5, title New}: only the
        // title differs, updatedAt is excluded from comparison.
        let mut remote = note("5", "New");
        remote.updated_at = "2024-09-09".to_string();
        let locals = vec![local("5", "Old")];

        let units = classify(&locals, &[remote]);
        match units.first() {
            Some(SyncUnit::Matched { field_diffs, .. }) => {
                assert_eq!(field_diffs, &vec!["title".to_string()]);
            }
            other => panic!("expected matched unit, got {other:?}"),
        }
    }

    #[test]
    fn tag_order_matters() {
        let mut remote = note("5", "t");
        remote.tags = vec!["b".to_string(), "a".to_string()];
        let mut local_note = local("5", "t");
        local_note.note.tags = vec!["a".to_string(), "b".to_string()];

        let diffs = field_diffs(&local_note.note, &remote);
        assert_eq!(diffs, vec!["tags".to_string()]);
    }

    #[test]
    fn extra_fields_are_compared_on_both_sides() {
        let mut remote = note("5", "t");
        remote
            .extra
            .insert("slug".to_string(), ScalarValue::from("remote-slug"));
        let mut local_note = note("5", "t");
        local_note
            .extra
            .insert("draftOf".to_string(), ScalarValue::from("x"));

        let mut diffs = field_diffs(&local_note, &remote);
        diffs.sort();
        assert_eq!(diffs, vec!["draftOf".to_string(), "slug".to_string()]);
    }

    #[test]
    fn matching_notes_produce_no_diffs() {
        let mut remote = note("5", "t");
        remote.tags = vec!["x".to_string()];
        remote
            .extra
            .insert("slug".to_string(), ScalarValue::from("s"));
        let mut local_note = remote.clone();
        // updatedAt drift alone never surfaces a conflict.
        local_note.updated_at = "2099-01-01".to_string();

        assert!(field_diffs(&local_note, &remote).is_empty());
    }

    #[test]
    fn unknown_ids_never_appear() {
        let units = classify(&[], &[]);
        assert!(units.is_empty());
    }
}
