//! Inputs, outputs, and decision vocabularies for the sync run.

use notesync_ports::{DecisionPort, LoggerPort, NoteFileSystemPort, RemotePort, VcsPort};
use notesync_shared::{ErrorCode, ErrorEnvelope, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Dependencies required by the sync orchestrator.
#[derive(Clone)]
pub struct SyncDeps {
    /// Remote note store adapter.
    pub remote: Arc<dyn RemotePort>,
    /// Interactive decision source.
    pub decisions: Arc<dyn DecisionPort>,
    /// Version-control collaborator.
    pub vcs: Arc<dyn VcsPort>,
    /// Notes directory adapter.
    pub filesystem: Arc<dyn NoteFileSystemPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Input payload for a sync run.
#[derive(Debug, Clone)]
pub struct SyncInput {
    /// Absolute path of the notes directory.
    pub notes_dir: PathBuf,
    /// Note-file extension, including the leading dot.
    pub extension: String,
    /// Commit message used when the user asks to commit pending changes.
    pub commit_message: String,
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The run reached a fixed point: both sides are equal.
    Completed,
    /// The user exited before reaching a fixed point.
    ExitedEarly,
}

/// Mutation counts accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncTally {
    /// Local creatables pushed to the remote store.
    pub created: usize,
    /// Remote-only notes materialized as local files.
    pub downloaded: usize,
    /// Conflicting local files overwritten with the remote baseline.
    pub overwritten: usize,
    /// Resolved local versions pushed back to the remote store.
    pub pushed: usize,
    /// Local files deleted on explicit request.
    pub deleted: usize,
}

/// Result of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutput {
    /// Terminal status.
    pub status: SyncStatus,
    /// Mutation counts.
    pub tally: SyncTally,
}

/// Whether a phase hands over to the next one or ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhaseOutcome {
    Continue,
    Exit,
}

/// Outcome of one conflict-review pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReviewOutcome {
    /// Zero conflicts remain.
    Clean,
    /// Conflicts remain and progress was made; run another pass.
    Repeat,
    /// The user exited, or a pass made no progress.
    Exit,
}

/// Decision offered while the working tree is dirty before the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecheckDecision {
    /// Commit everything with the configured message.
    Commit,
    /// Open the interactive VCS tool and re-check afterwards.
    ExternalTool,
    /// Query the working tree again.
    Recheck,
    /// End the run.
    Exit,
}

impl PrecheckDecision {
    /// Options presented to the decision source, in order.
    pub const OPTIONS: &'static [&'static str] = &["commit", "tool", "recheck", "exit"];

    /// Map a picked option back to a decision.
    pub fn from_answer(answer: &str) -> Result<Self> {
        match answer {
            "commit" => Ok(Self::Commit),
            "tool" => Ok(Self::ExternalTool),
            "recheck" => Ok(Self::Recheck),
            "exit" => Ok(Self::Exit),
            other => Err(unknown_answer(other)),
        }
    }
}

/// Decision offered when a local file's id is unknown remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRemoteDecision {
    /// Create a fresh remote note from the local content; the old id is
    /// abandoned and the file is rewritten with the new one.
    Recreate,
    /// Delete the local file.
    Delete,
    /// Leave the file alone this sweep.
    Skip,
}

impl MissingRemoteDecision {
    /// Options presented to the decision source, in order.
    pub const OPTIONS: &'static [&'static str] = &["recreate", "delete", "skip"];

    /// Map a picked option back to a decision.
    pub fn from_answer(answer: &str) -> Result<Self> {
        match answer {
            "recreate" => Ok(Self::Recreate),
            "delete" => Ok(Self::Delete),
            "skip" => Ok(Self::Skip),
            other => Err(unknown_answer(other)),
        }
    }
}

/// Decision offered when two local files carry the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateDecision {
    /// Delete the first of the two files.
    DeleteFirst,
    /// Delete the second of the two files.
    DeleteSecond,
    /// End the run.
    Exit,
}

impl DuplicateDecision {
    /// Options presented to the decision source, in order.
    pub const OPTIONS: &'static [&'static str] = &["delete-first", "delete-second", "exit"];

    /// Map a picked option back to a decision.
    pub fn from_answer(answer: &str) -> Result<Self> {
        match answer {
            "delete-first" => Ok(Self::DeleteFirst),
            "delete-second" => Ok(Self::DeleteSecond),
            "exit" => Ok(Self::Exit),
            other => Err(unknown_answer(other)),
        }
    }
}

/// Decision offered while the working tree is dirty during conflict review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewGateDecision {
    /// Open the interactive VCS tool and re-check afterwards.
    ExternalTool,
    /// Query the working tree again.
    Recheck,
    /// End the run.
    Exit,
}

impl ReviewGateDecision {
    /// Options presented to the decision source, in order.
    pub const OPTIONS: &'static [&'static str] = &["tool", "recheck", "exit"];

    /// Map a picked option back to a decision.
    pub fn from_answer(answer: &str) -> Result<Self> {
        match answer {
            "tool" => Ok(Self::ExternalTool),
            "recheck" => Ok(Self::Recheck),
            "exit" => Ok(Self::Exit),
            other => Err(unknown_answer(other)),
        }
    }
}

fn unknown_answer(answer: &str) -> ErrorEnvelope {
    ErrorEnvelope::invariant(
        ErrorCode::invalid_input(),
        format!("decision source returned an unknown answer: {answer}"),
    )
}
