//! `notesync sync`: one interactive synchronization sweep.

use super::{build_remote, cancel_on_ctrl_c, request_logger};
use crate::error::{CliError, ExitCode};
use notesync_adapters::fs::LocalNoteFileSystem;
use notesync_adapters::terminal::TerminalDecisions;
use notesync_adapters::vcs::GitCli;
use notesync_app::sync_notes::{SyncDeps, SyncInput, SyncStatus, sync_notes};
use notesync_config::load_sync_config_std_env;
use notesync_shared::RequestContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, verbose: bool) -> Result<ExitCode, CliError> {
    let config = load_sync_config_std_env(config_path)?;
    let ctx = RequestContext::new_request();
    cancel_on_ctrl_c(&ctx);

    let notes_dir = PathBuf::from(config.notes.dir.as_ref());
    let deps = SyncDeps {
        remote: build_remote(&config)?,
        decisions: Arc::new(TerminalDecisions::new()),
        vcs: Arc::new(GitCli::new(
            notes_dir.clone(),
            config.vcs.interactive_tool.clone(),
        )),
        filesystem: Arc::new(LocalNoteFileSystem::new()),
        logger: Some(request_logger(&ctx, verbose)),
    };
    let input = SyncInput {
        notes_dir,
        extension: config.notes.extension.to_string(),
        commit_message: config.vcs.commit_message.to_string(),
    };

    let output = sync_notes(&ctx, &deps, input).await?;

    match output.status {
        SyncStatus::Completed => println!("sync completed"),
        SyncStatus::ExitedEarly => println!("sync exited early"),
    }
    let tally = output.tally;
    println!(
        "created: {}  downloaded: {}  overwritten: {}  pushed: {}  deleted: {}",
        tally.created, tally.downloaded, tally.overwritten, tally.pushed, tally.deleted
    );

    Ok(ExitCode::Ok)
}
