//! Local note store: directory scan, resolution, and write-back.
//!
//! Scanning materializes a point-in-time snapshot before any classification
//! runs. A directory that cannot be listed is fatal (nothing downstream can
//! be trusted); a single file that fails to read or resolve is logged,
//! excluded from the snapshot, and never deleted.

use notesync_domain::localfile::{LocalNoteFile, extract_creatable, resolve_note};
use notesync_domain::reconcile::LocalResolvedNote;
use notesync_domain::{CreatableNote, NoteRecord, frontmatter};
use notesync_ports::{LogFields, LoggerPort, NoteFileSystemPort};
use notesync_shared::{NoteContextExt, RequestContext, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A local file representing a note the remote store does not know yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatableCandidate {
    /// Path of the backing file.
    pub path: PathBuf,
    /// The extracted creatable note.
    pub creatable: CreatableNote,
}

/// Point-in-time snapshot of the notes directory.
#[derive(Debug, Clone, Default)]
pub struct LocalSnapshot {
    /// Files that resolved into fully tracked notes, in file-name order.
    pub resolved: Vec<LocalResolvedNote>,
    /// Files without an id, eligible for remote creation.
    pub creatables: Vec<CreatableCandidate>,
    /// Files excluded from this sweep (unreadable or invalid frontmatter).
    pub skipped: Vec<PathBuf>,
    /// Lower-cased names of every listed file, for collision-safe writes.
    pub existing_lowercase: HashSet<String>,
}

/// Scan the notes directory into a snapshot.
///
/// Propagates a directory-listing failure; per-file failures are logged
/// and recorded in `skipped`.
pub async fn scan_local_notes(
    ctx: &RequestContext,
    filesystem: &dyn NoteFileSystemPort,
    logger: Option<&dyn LoggerPort>,
    dir: &Path,
    extension: &str,
) -> Result<LocalSnapshot> {
    ctx.ensure_not_cancelled("local_store.scan")?;

    let paths = filesystem
        .list_note_files(ctx, dir.to_path_buf(), extension.to_owned())
        .await
        .with_note_path(dir.display().to_string())?;

    let mut snapshot = LocalSnapshot::default();
    for path in &paths {
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            snapshot.existing_lowercase.insert(name.to_lowercase());
        }
    }

    for path in paths {
        ctx.ensure_not_cancelled("local_store.scan")?;

        let content = match filesystem.read_to_string(ctx, path.clone()).await {
            Ok(content) => content,
            Err(error) => {
                if let Some(logger) = logger {
                    logger.warn(
                        "notes.scan.read_failed",
                        "note file could not be read; excluded from this sweep",
                        Some(path_fields(&path, Some(&error.to_string()))),
                    );
                }
                snapshot.skipped.push(path);
                continue;
            },
        };

        let (fields, body) = frontmatter::decode(&content);
        let file = LocalNoteFile {
            path: path.clone(),
            frontmatter: fields,
            body,
        };

        if let Some(note) = resolve_note(&file) {
            snapshot.resolved.push(LocalResolvedNote { path, note });
            continue;
        }

        let modified = file_modified_date(ctx, filesystem, &path).await;
        if let Some(creatable) = extract_creatable(&file, &modified) {
            snapshot.creatables.push(CreatableCandidate { path, creatable });
            continue;
        }

        // Has an id key but is missing required fields: invalid, skip.
        if let Some(logger) = logger {
            logger.warn(
                "notes.scan.invalid_frontmatter",
                "note file is missing required frontmatter fields; excluded from this sweep",
                Some(path_fields(&path, None)),
            );
        }
        snapshot.skipped.push(path);
    }

    Ok(snapshot)
}

/// Serialize a note through the frontmatter codec and persist it.
pub async fn write_note(
    ctx: &RequestContext,
    filesystem: &dyn NoteFileSystemPort,
    path: PathBuf,
    note: &NoteRecord,
) -> Result<()> {
    let encoded = frontmatter::encode(note);
    filesystem
        .write_string(ctx, path.clone(), encoded)
        .await
        .with_note_path(path.display().to_string())
        .with_note_id(note.id.as_str())
}

async fn file_modified_date(
    ctx: &RequestContext,
    filesystem: &dyn NoteFileSystemPort,
    path: &Path,
) -> String {
    match filesystem.stat(ctx, path.to_path_buf()).await {
        Ok(stat) => date_from_epoch_ms(stat.mtime_ms),
        Err(_) => date_from_epoch_ms(0),
    }
}

/// Format epoch milliseconds as a `YYYY-MM-DD` date.
fn date_from_epoch_ms(ms: u64) -> String {
    let days = i64::try_from(ms / 86_400_000).unwrap_or(0);
    let (year, month, day) = civil_from_days(days);
    format!("{year:04}-{month:02}-{day:02}")
}

// Days-since-epoch to civil date (Gregorian, proleptic).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = u32::try_from(doy - (153 * mp + 2) / 5 + 1).unwrap_or(1);
    let month = u32::try_from(if mp < 10 { mp + 3 } else { mp - 9 }).unwrap_or(1);
    if month <= 2 {
        (year + 1, month, day)
    } else {
        (year, month, day)
    }
}

fn path_fields(path: &Path, error: Option<&str>) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "path".to_owned().into_boxed_str(),
        Value::String(path.display().to_string()),
    );
    if let Some(error) = error {
        fields.insert(
            "error".to_owned().into_boxed_str(),
            Value::String(error.to_owned()),
        );
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryFileSystem, MemoryLogger, tracked_note};

    const DIR: &str = "/notes";

    fn fs_with(files: &[(&str, &str)]) -> InMemoryFileSystem {
        let fs = InMemoryFileSystem::new();
        for (name, content) in files {
            fs.insert(format!("{DIR}/{name}"), *content);
        }
        fs
    }

    #[tokio::test]
    async fn snapshot_partitions_resolved_creatable_and_invalid() {
        let fs = fs_with(&[
            (
                "tracked.md",
                "---\nid: '5'\ndate: 2024-01-01\nupdatedAt: 2024-01-02\n---\nBody\n",
            ),
            ("draft.md", "---\ntitle: Draft\n---\nIdea\n"),
            ("broken.md", "---\nid: '9'\n---\nmissing timestamps\n"),
        ]);
        let logger = MemoryLogger::new();
        let ctx = RequestContext::new_request();

        let snapshot = scan_local_notes(&ctx, &fs, Some(&logger), Path::new(DIR), ".md")
            .await
            .expect("snapshot");

        assert_eq!(snapshot.resolved.len(), 1);
        assert_eq!(snapshot.resolved[0].note.id.as_str(), "5");
        assert_eq!(snapshot.creatables.len(), 1);
        assert_eq!(snapshot.creatables[0].creatable.title, "Draft");
        assert_eq!(snapshot.skipped.len(), 1);
        assert!(snapshot.existing_lowercase.contains("tracked.md"));

        let events = logger.events();
        assert!(
            events
                .iter()
                .any(|event| event.event.as_ref() == "notes.scan.invalid_frontmatter")
        );
    }

    #[tokio::test]
    async fn creatable_date_falls_back_to_modification_time() {
        let fs = fs_with(&[("idea.md", "just text\n")]);
        let ctx = RequestContext::new_request();

        let snapshot = scan_local_notes(&ctx, &fs, None, Path::new(DIR), ".md")
            .await
            .expect("snapshot");

        assert_eq!(snapshot.creatables.len(), 1);
        // TEST_MTIME_MS is 2024-01-01T00:00:00Z.
        assert_eq!(snapshot.creatables[0].creatable.date, "2024-01-01");
        assert_eq!(snapshot.creatables[0].creatable.title, "idea");
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let fs = InMemoryFileSystem::failing_listing();
        let ctx = RequestContext::new_request();

        let error = scan_local_notes(&ctx, &fs, None, Path::new(DIR), ".md")
            .await
            .expect_err("listing failure");
        assert_eq!(error.metadata.get("path").map(String::as_str), Some(DIR));
    }

    #[tokio::test]
    async fn write_note_round_trips_through_the_codec() {
        let fs = InMemoryFileSystem::new();
        let ctx = RequestContext::new_request();
        let note = tracked_note("7", "Kept", "The body\n");

        write_note(&ctx, &fs, PathBuf::from("/notes/kept.md"), &note)
            .await
            .expect("write");

        let snapshot = scan_local_notes(&ctx, &fs, None, Path::new(DIR), ".md")
            .await
            .expect("snapshot");
        assert_eq!(snapshot.resolved.len(), 1);
        assert_eq!(snapshot.resolved[0].note.content, "The body\n");
        assert_eq!(snapshot.resolved[0].note.title, "Kept");
    }

    #[test]
    fn epoch_dates_are_formatted_as_civil_dates() {
        assert_eq!(date_from_epoch_ms(0), "1970-01-01");
        assert_eq!(date_from_epoch_ms(1_704_067_200_000), "2024-01-01");
        assert_eq!(date_from_epoch_ms(1_709_164_800_000), "2024-02-29");
    }
}
