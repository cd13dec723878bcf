//! Working-tree cleanliness gate before anything is overwritten.

use super::types::{PhaseOutcome, PrecheckDecision, SyncDeps, SyncInput};
use notesync_ports::WorkingTreeState;
use notesync_shared::{RequestContext, Result};
use serde_json::Value;

/// Loop until the working tree is clean or the user exits.
pub(crate) async fn run(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: &SyncInput,
) -> Result<PhaseOutcome> {
    loop {
        ctx.ensure_not_cancelled("sync.precheck")?;

        let state = deps.vcs.working_tree_state(ctx).await?;
        let summary = match state {
            WorkingTreeState::Clean => return Ok(PhaseOutcome::Continue),
            WorkingTreeState::Dirty { summary } => summary,
        };

        if let Some(logger) = deps.logger.as_ref() {
            let mut fields = notesync_ports::LogFields::new();
            fields.insert(
                "summary".to_owned().into_boxed_str(),
                Value::String(summary.clone()),
            );
            logger.info(
                "sync.precheck.dirty",
                "working tree has uncommitted changes",
                Some(fields),
            );
        }

        let prompt = format!("Uncommitted changes in the notes directory:\n{summary}\nHow do you want to proceed?");
        let answer = deps
            .decisions
            .pick_one(ctx, &prompt, PrecheckDecision::OPTIONS)
            .await?;

        match PrecheckDecision::from_answer(&answer)? {
            PrecheckDecision::Commit => {
                deps.vcs
                    .commit_all(ctx, input.commit_message.clone())
                    .await?;
            },
            PrecheckDecision::ExternalTool => {
                deps.vcs.open_interactive_tool(ctx).await?;
            },
            PrecheckDecision::Recheck => {},
            PrecheckDecision::Exit => return Ok(PhaseOutcome::Exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, InMemoryFileSystem, InMemoryRemote, ScriptedDecisions, ScriptedVcs};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn input() -> SyncInput {
        SyncInput {
            notes_dir: PathBuf::from("/notes"),
            extension: ".md".to_owned(),
            commit_message: "sync notes".to_owned(),
        }
    }

    fn deps(vcs: Arc<ScriptedVcs>, decisions: ScriptedDecisions) -> SyncDeps {
        SyncDeps {
            remote: Arc::new(InMemoryRemote::new()),
            decisions: Arc::new(decisions),
            vcs,
            filesystem: Arc::new(InMemoryFileSystem::new()),
            logger: None,
        }
    }

    #[tokio::test]
    async fn clean_tree_continues_without_prompting() {
        let vcs = Arc::new(ScriptedVcs::clean());
        let deps = deps(vcs, ScriptedDecisions::script(Vec::new()));
        let ctx = RequestContext::new_request();

        let outcome = run(&ctx, &deps, &input()).await.expect("precheck");
        assert_eq!(outcome, PhaseOutcome::Continue);
    }

    #[tokio::test]
    async fn commit_decision_commits_and_rechecks() {
        let vcs = Arc::new(ScriptedVcs::with_states(vec![WorkingTreeState::Dirty {
            summary: " M journal.md".to_owned(),
        }]));
        let deps = deps(
            vcs.clone(),
            ScriptedDecisions::script(vec![Answer::Pick("commit")]),
        );
        let ctx = RequestContext::new_request();

        let outcome = run(&ctx, &deps, &input()).await.expect("precheck");
        assert_eq!(outcome, PhaseOutcome::Continue);
        assert_eq!(vcs.commits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tool_decision_opens_tool_then_rechecks() {
        let vcs = Arc::new(ScriptedVcs::with_states(vec![
            WorkingTreeState::Dirty {
                summary: " M journal.md".to_owned(),
            },
            WorkingTreeState::Clean,
        ]));
        let deps = deps(
            vcs.clone(),
            ScriptedDecisions::script(vec![Answer::Pick("tool")]),
        );
        let ctx = RequestContext::new_request();

        let outcome = run(&ctx, &deps, &input()).await.expect("precheck");
        assert_eq!(outcome, PhaseOutcome::Continue);
        assert_eq!(vcs.tool_opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exit_decision_ends_the_run() {
        let vcs = Arc::new(ScriptedVcs::with_states(vec![WorkingTreeState::Dirty {
            summary: "?? scratch.md".to_owned(),
        }]));
        let deps = deps(vcs, ScriptedDecisions::script(vec![Answer::Pick("exit")]));
        let ctx = RequestContext::new_request();

        let outcome = run(&ctx, &deps, &input()).await.expect("precheck");
        assert_eq!(outcome, PhaseOutcome::Exit);
    }
}
