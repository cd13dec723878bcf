//! Tracking repair: give every local file a live remote identity.

use super::types::{DuplicateDecision, MissingRemoteDecision, PhaseOutcome, SyncDeps, SyncInput, SyncTally};
use crate::local_store::{CreatableCandidate, scan_local_notes, write_note};
use notesync_domain::CreatableNote;
use notesync_domain::reconcile::LocalResolvedNote;
use notesync_ports::LogFields;
use notesync_shared::{RequestContext, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Create untracked notes remotely, repair dead or duplicated ids.
pub(crate) async fn run(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: &SyncInput,
    tally: &mut SyncTally,
) -> Result<PhaseOutcome> {
    ctx.ensure_not_cancelled("sync.track")?;

    let snapshot = scan_local_notes(
        ctx,
        deps.filesystem.as_ref(),
        deps.logger.as_deref(),
        &input.notes_dir,
        &input.extension,
    )
    .await?;

    for candidate in &snapshot.creatables {
        create_remote(ctx, deps, candidate, tally).await?;
    }

    let mut deleted: HashSet<PathBuf> = HashSet::new();
    if resolve_duplicates(ctx, deps, &snapshot.resolved, tally, &mut deleted).await?
        == PhaseOutcome::Exit
    {
        return Ok(PhaseOutcome::Exit);
    }

    let remote_ids: HashSet<String> = deps
        .remote
        .get_all_notes_metadata(ctx)
        .await?
        .into_iter()
        .map(|metadata| metadata.id.as_str().to_owned())
        .collect();

    for local in &snapshot.resolved {
        if deleted.contains(&local.path) || remote_ids.contains(local.note.id.as_str()) {
            continue;
        }
        repair_missing_remote(ctx, deps, local, tally).await?;
    }

    Ok(PhaseOutcome::Continue)
}

async fn create_remote(
    ctx: &RequestContext,
    deps: &SyncDeps,
    candidate: &CreatableCandidate,
    tally: &mut SyncTally,
) -> Result<()> {
    ctx.ensure_not_cancelled("sync.track.create")?;

    let prompt = format!(
        "Create '{}' ({}) in the remote store?",
        candidate.creatable.title,
        candidate.path.display()
    );
    if !deps.decisions.confirm(ctx, &prompt).await? {
        log_note(
            deps,
            "sync.track.create_declined",
            "remote creation declined; file left untracked",
            &candidate.path,
            None,
            &candidate.creatable.title,
        );
        return Ok(());
    }

    let record = deps
        .remote
        .create_note(ctx, candidate.creatable.clone())
        .await?;
    // The file keeps its path; only the frontmatter gains the assigned id.
    write_note(ctx, deps.filesystem.as_ref(), candidate.path.clone(), &record).await?;
    tally.created += 1;

    log_note(
        deps,
        "sync.track.created",
        "local note created remotely and rewritten with its id",
        &candidate.path,
        Some(record.id.as_str()),
        &record.title,
    );
    Ok(())
}

async fn resolve_duplicates(
    ctx: &RequestContext,
    deps: &SyncDeps,
    resolved: &[LocalResolvedNote],
    tally: &mut SyncTally,
    deleted: &mut HashSet<PathBuf>,
) -> Result<PhaseOutcome> {
    let mut by_id: BTreeMap<&str, Vec<&LocalResolvedNote>> = BTreeMap::new();
    for local in resolved {
        by_id.entry(local.note.id.as_str()).or_default().push(local);
    }

    for (id, mut group) in by_id {
        while group.len() > 1 {
            ctx.ensure_not_cancelled("sync.track.duplicates")?;

            let first = group[0];
            let second = group[1];
            let prompt = format!(
                "Two files are tracked as note {id}:\n  first:  {}\n  second: {}\nWhich one should be deleted?",
                first.path.display(),
                second.path.display()
            );
            let answer = deps
                .decisions
                .pick_one(ctx, &prompt, DuplicateDecision::OPTIONS)
                .await?;

            let victim = match DuplicateDecision::from_answer(&answer)? {
                DuplicateDecision::DeleteFirst => 0,
                DuplicateDecision::DeleteSecond => 1,
                DuplicateDecision::Exit => return Ok(PhaseOutcome::Exit),
            };
            let removed = group.remove(victim);
            deps.filesystem
                .remove_file(ctx, removed.path.clone())
                .await?;
            deleted.insert(removed.path.clone());
            tally.deleted += 1;

            log_note(
                deps,
                "sync.track.duplicate_deleted",
                "duplicate tracking file deleted",
                &removed.path,
                Some(id),
                &removed.note.title,
            );
        }
    }

    Ok(PhaseOutcome::Continue)
}

async fn repair_missing_remote(
    ctx: &RequestContext,
    deps: &SyncDeps,
    local: &LocalResolvedNote,
    tally: &mut SyncTally,
) -> Result<()> {
    ctx.ensure_not_cancelled("sync.track.missing")?;

    let prompt = format!(
        "Note {} ('{}', {}) does not exist remotely. What should happen?",
        local.note.id.as_str(),
        local.note.title,
        local.path.display()
    );
    let answer = deps
        .decisions
        .pick_one(ctx, &prompt, MissingRemoteDecision::OPTIONS)
        .await?;

    match MissingRemoteDecision::from_answer(&answer)? {
        MissingRemoteDecision::Recreate => {
            let creatable = CreatableNote {
                title: local.note.title.clone(),
                content: local.note.content.clone(),
                date: local.note.date.clone(),
                tags: local.note.tags.clone(),
                extra: local.note.extra.clone(),
            };
            // The old id is abandoned; the file is rewritten with the new one.
            let record = deps.remote.create_note(ctx, creatable).await?;
            write_note(ctx, deps.filesystem.as_ref(), local.path.clone(), &record).await?;
            tally.created += 1;
            log_note(
                deps,
                "sync.track.recreated",
                "dead-id note recreated remotely",
                &local.path,
                Some(record.id.as_str()),
                &record.title,
            );
        },
        MissingRemoteDecision::Delete => {
            deps.filesystem
                .remove_file(ctx, local.path.clone())
                .await?;
            tally.deleted += 1;
            log_note(
                deps,
                "sync.track.deleted",
                "dead-id note deleted locally",
                &local.path,
                Some(local.note.id.as_str()),
                &local.note.title,
            );
        },
        MissingRemoteDecision::Skip => {
            log_note(
                deps,
                "sync.track.skipped",
                "dead-id note left untouched this sweep",
                &local.path,
                Some(local.note.id.as_str()),
                &local.note.title,
            );
        },
    }
    Ok(())
}

fn log_note(
    deps: &SyncDeps,
    event: &str,
    message: &str,
    path: &Path,
    id: Option<&str>,
    title: &str,
) {
    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert(
            "path".to_owned().into_boxed_str(),
            Value::String(path.display().to_string()),
        );
        if let Some(id) = id {
            fields.insert(
                "noteId".to_owned().into_boxed_str(),
                Value::String(id.to_owned()),
            );
        }
        fields.insert(
            "title".to_owned().into_boxed_str(),
            Value::String(title.to_owned()),
        );
        logger.info(event, message, Some(fields));
    }
}
