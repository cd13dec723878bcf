//! Interactive synchronization state machine.
//!
//! Phases run in the fixed order `GitPrecheck -> EnsureTracked -> Download
//! -> ConflictSurface -> ConflictReview -> Done`; every move is validated
//! against the domain transition table. Each phase re-scans both sides
//! before acting, so decisions are always made against a fresh snapshot.

mod conflicts;
mod download;
mod precheck;
mod tracking;
mod types;

pub use types::{
    DuplicateDecision, MissingRemoteDecision, PrecheckDecision, ReviewGateDecision, SyncDeps,
    SyncInput, SyncOutput, SyncStatus, SyncTally,
};

use notesync_domain::states::{SyncPhase, is_allowed_transition};
use notesync_ports::LogFields;
use notesync_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use types::{PhaseOutcome, ReviewOutcome};

/// Run one full synchronization sweep.
///
/// On `SyncStatus::Completed`, a fresh reclassification of both sides
/// would yield zero local-only, remote-only, and conflicting units.
pub async fn sync_notes(
    ctx: &RequestContext,
    deps: &SyncDeps,
    input: SyncInput,
) -> Result<SyncOutput> {
    let mut tally = SyncTally::default();
    let mut status = SyncStatus::Completed;
    let mut phase = SyncPhase::GitPrecheck;

    loop {
        log_phase(deps, phase);

        let next = match phase {
            SyncPhase::GitPrecheck => match precheck::run(ctx, deps, &input).await? {
                PhaseOutcome::Continue => SyncPhase::EnsureTracked,
                PhaseOutcome::Exit => exit_early(&mut status),
            },
            SyncPhase::EnsureTracked => match tracking::run(ctx, deps, &input, &mut tally).await? {
                PhaseOutcome::Continue => SyncPhase::Download,
                PhaseOutcome::Exit => exit_early(&mut status),
            },
            SyncPhase::Download => match download::run(ctx, deps, &input, &mut tally).await? {
                PhaseOutcome::Continue => SyncPhase::ConflictSurface,
                PhaseOutcome::Exit => exit_early(&mut status),
            },
            SyncPhase::ConflictSurface => {
                match conflicts::surface(ctx, deps, &input, &mut tally).await? {
                    PhaseOutcome::Continue => SyncPhase::ConflictReview,
                    PhaseOutcome::Exit => exit_early(&mut status),
                }
            },
            SyncPhase::ConflictReview => {
                match conflicts::review(ctx, deps, &input, &mut tally).await? {
                    ReviewOutcome::Clean => SyncPhase::Done,
                    ReviewOutcome::Repeat => SyncPhase::ConflictReview,
                    ReviewOutcome::Exit => exit_early(&mut status),
                }
            },
            SyncPhase::Done => break,
        };

        phase = transition(phase, next)?;
    }

    deps.remote.disconnect(ctx).await?;
    log_done(deps, status, tally);

    Ok(SyncOutput { status, tally })
}

fn exit_early(status: &mut SyncStatus) -> SyncPhase {
    *status = SyncStatus::ExitedEarly;
    SyncPhase::Done
}

fn transition(from: SyncPhase, to: SyncPhase) -> Result<SyncPhase> {
    if is_allowed_transition(from, to) {
        Ok(to)
    } else {
        Err(ErrorEnvelope::invariant(
            ErrorCode::internal(),
            format!("illegal phase transition {} -> {}", from.as_str(), to.as_str()),
        ))
    }
}

fn log_phase(deps: &SyncDeps, phase: SyncPhase) {
    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert(
            "phase".to_owned().into_boxed_str(),
            Value::String(phase.as_str().to_owned()),
        );
        logger.info("sync.phase", "entering phase", Some(fields));
    }
}

fn log_done(deps: &SyncDeps, status: SyncStatus, tally: SyncTally) {
    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert(
            "completed".to_owned().into_boxed_str(),
            Value::Bool(status == SyncStatus::Completed),
        );
        fields.insert("created".to_owned().into_boxed_str(), Value::from(tally.created));
        fields.insert(
            "downloaded".to_owned().into_boxed_str(),
            Value::from(tally.downloaded),
        );
        fields.insert(
            "overwritten".to_owned().into_boxed_str(),
            Value::from(tally.overwritten),
        );
        fields.insert("pushed".to_owned().into_boxed_str(), Value::from(tally.pushed));
        fields.insert("deleted".to_owned().into_boxed_str(), Value::from(tally.deleted));
        logger.info("sync.done", "synchronization run finished", Some(fields));
    }
}
