//! Conflict surfacing and interactive review.
//!
//! Surfacing overwrites every conflicting local file with the remote
//! version, so the human edits against a known-good, version-controlled
//! baseline. Review then loops: wait for a clean working tree, recompute
//! conflicts from fresh snapshots, and push confirmed local versions back.

use super::types::{PhaseOutcome, ReviewGateDecision, ReviewOutcome, SyncDeps, SyncInput, SyncTally};
use crate::local_store::{scan_local_notes, write_note};
use notesync_domain::NoteRecord;
use notesync_domain::reconcile::{SyncUnit, classify};
use notesync_ports::{LogFields, WorkingTreeState};
use notesync_shared::{RequestContext, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Overwrite conflicting local files with the remote baseline.
pub(crate) async fn surface(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: &SyncInput,
    tally: &mut SyncTally,
) -> Result<PhaseOutcome> {
    for conflict in conflicts(ctx, deps, input).await? {
        ctx.ensure_not_cancelled("sync.surface")?;

        write_note(ctx, deps.filesystem.as_ref(), conflict.path.clone(), &conflict.remote).await?;
        tally.overwritten += 1;
        log_conflict(
            deps,
            "sync.surface.overwritten",
            "conflicting local file reset to the remote baseline",
            &conflict,
        );
    }
    Ok(PhaseOutcome::Continue)
}

/// One conflict-review pass: tree gate, fresh reclassification, pushes.
pub(crate) async fn review(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: &SyncInput,
    tally: &mut SyncTally,
) -> Result<ReviewOutcome> {
    if gate_on_clean_tree(ctx, deps).await? == PhaseOutcome::Exit {
        return Ok(ReviewOutcome::Exit);
    }

    // The human may have edited anything while the tree was dirty; never
    // trust a conflict set computed before the pause.
    let remaining = conflicts(ctx, deps, input).await?;
    if remaining.is_empty() {
        return Ok(ReviewOutcome::Clean);
    }

    let mut pushed_this_pass = 0usize;
    for conflict in &remaining {
        ctx.ensure_not_cancelled("sync.review")?;

        let prompt = format!(
            "Push your local version of {} ('{}') to the remote store?",
            conflict.local.id.as_str(),
            conflict.local.title
        );
        if !deps.decisions.confirm(ctx, &prompt).await? {
            log_conflict(
                deps,
                "sync.review.push_declined",
                "push declined; conflict remains",
                conflict,
            );
            continue;
        }

        deps.remote
            .update_note(ctx, conflict.local.id.clone(), conflict.local.clone())
            .await?;
        tally.pushed += 1;
        pushed_this_pass += 1;
        log_conflict(
            deps,
            "sync.review.pushed",
            "local version pushed to the remote store",
            conflict,
        );
    }

    if pushed_this_pass == 0 {
        // Every remaining conflict was declined; another pass would only
        // repeat the same questions.
        if let Some(logger) = deps.logger.as_ref() {
            let mut fields = LogFields::new();
            fields.insert(
                "remaining".to_owned().into_boxed_str(),
                Value::from(remaining.len()),
            );
            logger.warn(
                "sync.review.stalled",
                "conflicts remain but no push was confirmed; ending the run",
                Some(fields),
            );
        }
        return Ok(ReviewOutcome::Exit);
    }
    Ok(ReviewOutcome::Repeat)
}

/// A matched local/remote pair with at least one differing field.
#[derive(Debug, Clone)]
pub(crate) struct Conflict {
    pub path: PathBuf,
    pub local: NoteRecord,
    pub remote: NoteRecord,
    pub field_diffs: Vec<String>,
}

async fn conflicts(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: &SyncInput,
) -> Result<Vec<Conflict>> {
    ctx.ensure_not_cancelled("sync.classify")?;

    let snapshot = scan_local_notes(
        ctx,
        deps.filesystem.as_ref(),
        deps.logger.as_deref(),
        &input.notes_dir,
        &input.extension,
    )
    .await?;
    let remotes = deps.remote.get_all_notes(ctx).await?;

    Ok(classify(&snapshot.resolved, &remotes)
        .into_iter()
        .filter_map(|unit| match unit {
            SyncUnit::Matched {
                path,
                local,
                remote,
                field_diffs,
            } if !field_diffs.is_empty() => Some(Conflict {
                path,
                local,
                remote,
                field_diffs,
            }),
            _ => None,
        })
        .collect())
}

async fn gate_on_clean_tree(ctx: &RequestContext, deps: &SyncDeps) -> Result<PhaseOutcome> {
    loop {
        ctx.ensure_not_cancelled("sync.review.gate")?;

        let state = deps.vcs.working_tree_state(ctx).await?;
        let summary = match state {
            WorkingTreeState::Clean => return Ok(PhaseOutcome::Continue),
            WorkingTreeState::Dirty { summary } => summary,
        };

        let prompt = format!(
            "Your edits are still uncommitted:\n{summary}\nReview them before conflicts are pushed."
        );
        let answer = deps
            .decisions
            .pick_one(ctx, &prompt, ReviewGateDecision::OPTIONS)
            .await?;

        match ReviewGateDecision::from_answer(&answer)? {
            ReviewGateDecision::ExternalTool => deps.vcs.open_interactive_tool(ctx).await?,
            ReviewGateDecision::Recheck => {},
            ReviewGateDecision::Exit => return Ok(PhaseOutcome::Exit),
        }
    }
}

fn log_conflict(deps: &SyncDeps, event: &str, message: &str, conflict: &Conflict) {
    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert(
            "path".to_owned().into_boxed_str(),
            Value::String(conflict.path.display().to_string()),
        );
        fields.insert(
            "noteId".to_owned().into_boxed_str(),
            Value::String(conflict.local.id.as_str().to_owned()),
        );
        fields.insert(
            "title".to_owned().into_boxed_str(),
            Value::String(conflict.local.title.clone()),
        );
        fields.insert(
            "fieldDiffs".to_owned().into_boxed_str(),
            Value::from(conflict.field_diffs.clone()),
        );
        logger.info(event, message, Some(fields));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, InMemoryFileSystem, InMemoryRemote, ScriptedDecisions, ScriptedVcs, tracked_note};
    use notesync_domain::frontmatter;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    const DIR: &str = "/notes";

    fn input() -> SyncInput {
        SyncInput {
            notes_dir: PathBuf::from(DIR),
            extension: ".md".to_owned(),
            commit_message: "sync notes".to_owned(),
        }
    }

    fn deps(
        fs: Arc<InMemoryFileSystem>,
        remote: Arc<InMemoryRemote>,
        vcs: Arc<ScriptedVcs>,
        decisions: ScriptedDecisions,
    ) -> SyncDeps {
        SyncDeps {
            remote,
            decisions: Arc::new(decisions),
            vcs,
            filesystem: fs,
            logger: None,
        }
    }

    fn seed_conflict(fs: &InMemoryFileSystem, remote: &InMemoryRemote) {
        let mut local = tracked_note("5", "Old title", "Shared body\n");
        local.updated_at = "2024-01-05T00:00:00Z".to_owned();
        fs.insert(format!("{DIR}/note.md"), frontmatter::encode(&local));
        remote.seed(tracked_note("5", "New title", "Shared body\n"));
    }

    #[tokio::test]
    async fn surfacing_resets_local_files_to_the_remote_version() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let remote = Arc::new(InMemoryRemote::new());
        seed_conflict(&fs, &remote);
        let deps = deps(
            fs.clone(),
            remote,
            Arc::new(ScriptedVcs::clean()),
            ScriptedDecisions::script(Vec::new()),
        );
        let ctx = RequestContext::new_request();
        let mut tally = SyncTally::default();

        let outcome = surface(&ctx, &deps, &input(), &mut tally).await.expect("surface");
        assert_eq!(outcome, PhaseOutcome::Continue);
        assert_eq!(tally.overwritten, 1);

        let rewritten = fs
            .contents()
            .get(&PathBuf::from(format!("{DIR}/note.md")))
            .cloned()
            .expect("file kept");
        assert!(rewritten.contains("title: New title"));
    }

    #[tokio::test]
    async fn review_with_no_conflicts_is_clean() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let remote = Arc::new(InMemoryRemote::new());
        let note = tracked_note("5", "Same", "Same body\n");
        fs.insert(format!("{DIR}/note.md"), frontmatter::encode(&note));
        remote.seed(note);
        let deps = deps(
            fs,
            remote,
            Arc::new(ScriptedVcs::clean()),
            ScriptedDecisions::script(Vec::new()),
        );
        let ctx = RequestContext::new_request();
        let mut tally = SyncTally::default();

        let outcome = review(&ctx, &deps, &input(), &mut tally).await.expect("review");
        assert_eq!(outcome, ReviewOutcome::Clean);
    }

    #[tokio::test]
    async fn confirmed_push_updates_the_remote_store() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let remote = Arc::new(InMemoryRemote::new());
        seed_conflict(&fs, &remote);
        let deps = deps(
            fs,
            remote.clone(),
            Arc::new(ScriptedVcs::clean()),
            ScriptedDecisions::script(vec![Answer::Confirm(true)]),
        );
        let ctx = RequestContext::new_request();
        let mut tally = SyncTally::default();

        let outcome = review(&ctx, &deps, &input(), &mut tally).await.expect("review");
        assert_eq!(outcome, ReviewOutcome::Repeat);
        assert_eq!(tally.pushed, 1);
        assert_eq!(remote.updates.load(Ordering::SeqCst), 1);
        assert_eq!(remote.records()[0].title, "Old title");
    }

    #[tokio::test]
    async fn declining_every_push_ends_the_run_instead_of_looping() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let remote = Arc::new(InMemoryRemote::new());
        seed_conflict(&fs, &remote);
        let deps = deps(
            fs,
            remote,
            Arc::new(ScriptedVcs::clean()),
            ScriptedDecisions::script(vec![Answer::Confirm(false)]),
        );
        let ctx = RequestContext::new_request();
        let mut tally = SyncTally::default();

        let outcome = review(&ctx, &deps, &input(), &mut tally).await.expect("review");
        assert_eq!(outcome, ReviewOutcome::Exit);
        assert_eq!(tally.pushed, 0);
    }

    #[tokio::test]
    async fn dirty_tree_gate_loops_until_clean() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let remote = Arc::new(InMemoryRemote::new());
        let vcs = Arc::new(ScriptedVcs::with_states(vec![
            WorkingTreeState::Dirty {
                summary: " M note.md".to_owned(),
            },
            WorkingTreeState::Clean,
        ]));
        let deps = deps(
            fs,
            remote,
            vcs.clone(),
            ScriptedDecisions::script(vec![Answer::Pick("tool")]),
        );
        let ctx = RequestContext::new_request();
        let mut tally = SyncTally::default();

        let outcome = review(&ctx, &deps, &input(), &mut tally).await.expect("review");
        assert_eq!(outcome, ReviewOutcome::Clean);
        assert_eq!(vcs.tool_opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gate_exit_ends_the_run() {
        let fs = Arc::new(InMemoryFileSystem::new());
        let remote = Arc::new(InMemoryRemote::new());
        let vcs = Arc::new(ScriptedVcs::with_states(vec![WorkingTreeState::Dirty {
            summary: " M note.md".to_owned(),
        }]));
        let deps = deps(
            fs,
            remote,
            vcs,
            ScriptedDecisions::script(vec![Answer::Pick("exit")]),
        );
        let ctx = RequestContext::new_request();
        let mut tally = SyncTally::default();

        let outcome = review(&ctx, &deps, &input(), &mut tally).await.expect("review");
        assert_eq!(outcome, ReviewOutcome::Exit);
    }
}
