//! Download: materialize remote-only notes as local files.

use super::types::{PhaseOutcome, SyncDeps, SyncInput, SyncTally};
use crate::local_store::{scan_local_notes, write_note};
use notesync_domain::reconcile::{SyncUnit, classify};
use notesync_domain::generate_safe_filename;
use notesync_ports::LogFields;
use notesync_shared::{RequestContext, Result};
use serde_json::Value;

/// Offer every remote-only note for download into the notes directory.
pub(crate) async fn run(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: &SyncInput,
    tally: &mut SyncTally,
) -> Result<PhaseOutcome> {
    ctx.ensure_not_cancelled("sync.download")?;

    let snapshot = scan_local_notes(
        ctx,
        deps.filesystem.as_ref(),
        deps.logger.as_deref(),
        &input.notes_dir,
        &input.extension,
    )
    .await?;
    let remotes = deps.remote.get_all_notes(ctx).await?;
    let units = classify(&snapshot.resolved, &remotes);

    let mut existing = snapshot.existing_lowercase;
    for unit in units {
        let SyncUnit::RemoteOnly { note } = unit else {
            continue;
        };
        ctx.ensure_not_cancelled("sync.download")?;

        let prompt = format!(
            "Download remote note {} ('{}') into the notes directory?",
            note.id.as_str(),
            note.title
        );
        if !deps.decisions.confirm(ctx, &prompt).await? {
            log_download(deps, "sync.download.declined", "download declined", &note, None);
            continue;
        }

        // A stale file with the same derived name may already exist; the
        // collision counter steps around it instead of overwriting.
        let name = generate_safe_filename(&note.title, note.id.as_str(), &input.extension, &existing);
        existing.insert(name.to_lowercase());
        let path = input.notes_dir.join(&name);

        write_note(ctx, deps.filesystem.as_ref(), path.clone(), &note).await?;
        tally.downloaded += 1;
        log_download(
            deps,
            "sync.download.written",
            "remote-only note written locally",
            &note,
            Some(&name),
        );
    }

    Ok(PhaseOutcome::Continue)
}

fn log_download(
    deps: &SyncDeps,
    event: &str,
    message: &str,
    note: &notesync_domain::NoteRecord,
    file_name: Option<&str>,
) {
    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert(
            "noteId".to_owned().into_boxed_str(),
            Value::String(note.id.as_str().to_owned()),
        );
        fields.insert(
            "title".to_owned().into_boxed_str(),
            Value::String(note.title.clone()),
        );
        if let Some(file_name) = file_name {
            fields.insert(
                "fileName".to_owned().into_boxed_str(),
                Value::String(file_name.to_owned()),
            );
        }
        logger.info(event, message, Some(fields));
    }
}
