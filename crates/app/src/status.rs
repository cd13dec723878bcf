//! Read-only reconciliation sweep, summarized.

use crate::local_store::scan_local_notes;
use notesync_domain::reconcile::field_diffs;
use notesync_domain::NoteId;
use notesync_ports::{LoggerPort, NoteFileSystemPort, RemotePort};
use notesync_shared::{RequestContext, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Dependencies for the status sweep.
#[derive(Clone)]
pub struct StatusDeps {
    /// Remote note store adapter.
    pub remote: Arc<dyn RemotePort>,
    /// Notes directory adapter.
    pub filesystem: Arc<dyn NoteFileSystemPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Input payload for the status sweep.
#[derive(Debug, Clone)]
pub struct StatusInput {
    /// Absolute path of the notes directory.
    pub notes_dir: PathBuf,
    /// Note-file extension, including the leading dot.
    pub extension: String,
}

/// A conflicting matched pair, summarized for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictSummary {
    /// Note id present on both sides.
    pub id: NoteId,
    /// Local title.
    pub title: String,
    /// Names of the differing fields.
    pub fields: Vec<String>,
}

/// Summary of one read-only sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    /// Ids tracked locally but unknown remotely.
    pub local_only: usize,
    /// Ids known remotely with no local file.
    pub remote_only: usize,
    /// Matched ids with no differing fields.
    pub in_sync: usize,
    /// Local files without an id.
    pub creatables: usize,
    /// Files excluded from the sweep.
    pub skipped: usize,
    /// Matched ids with differing fields.
    pub conflicts: Vec<ConflictSummary>,
}

/// Run one reconciliation sweep without mutating either side.
///
/// Uses the lighter metadata listing to partition ids and fetches full
/// records only for matched pairs, where field diffs need the content.
pub async fn status(
    ctx: &RequestContext,
    deps: &StatusDeps,
    input: StatusInput,
) -> Result<StatusReport> {
    ctx.ensure_not_cancelled("status.sweep")?;

    let snapshot = scan_local_notes(
        ctx,
        deps.filesystem.as_ref(),
        deps.logger.as_deref(),
        &input.notes_dir,
        &input.extension,
    )
    .await?;
    let metadata = deps.remote.get_all_notes_metadata(ctx).await?;

    let mut remote_ids: BTreeMap<&str, ()> = BTreeMap::new();
    for entry in &metadata {
        remote_ids.insert(entry.id.as_str(), ());
    }

    let mut report = StatusReport {
        creatables: snapshot.creatables.len(),
        skipped: snapshot.skipped.len(),
        ..StatusReport::default()
    };

    for local in &snapshot.resolved {
        if !remote_ids.contains_key(local.note.id.as_str()) {
            report.local_only += 1;
        }
    }
    report.remote_only = metadata
        .iter()
        .filter(|entry| {
            !snapshot
                .resolved
                .iter()
                .any(|local| local.note.id.as_str() == entry.id.as_str())
        })
        .count();

    for local in &snapshot.resolved {
        if !remote_ids.contains_key(local.note.id.as_str()) {
            continue;
        }
        ctx.ensure_not_cancelled("status.sweep")?;

        let Some(remote) = deps
            .remote
            .get_note_by_id(ctx, local.note.id.clone())
            .await?
        else {
            // Listed a moment ago but gone now; count it as out of sync
            // rather than guessing.
            report.local_only += 1;
            continue;
        };

        let fields = field_diffs(&local.note, &remote);
        if fields.is_empty() {
            report.in_sync += 1;
        } else {
            report.conflicts.push(ConflictSummary {
                id: local.note.id.clone(),
                title: local.note.title.clone(),
                fields,
            });
        }
    }

    Ok(report)
}
