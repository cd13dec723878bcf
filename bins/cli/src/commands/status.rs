//! `notesync status`: a read-only reconciliation summary.

use super::{build_remote, cancel_on_ctrl_c, request_logger};
use crate::error::{CliError, ExitCode};
use notesync_adapters::fs::LocalNoteFileSystem;
use notesync_app::status::{StatusDeps, StatusInput, StatusReport, status};
use notesync_config::load_sync_config_std_env;
use notesync_shared::RequestContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, verbose: bool) -> Result<ExitCode, CliError> {
    let config = load_sync_config_std_env(config_path)?;
    let ctx = RequestContext::new_request();
    cancel_on_ctrl_c(&ctx);

    let deps = StatusDeps {
        remote: build_remote(&config)?,
        filesystem: Arc::new(LocalNoteFileSystem::new()),
        logger: Some(request_logger(&ctx, verbose)),
    };
    let input = StatusInput {
        notes_dir: PathBuf::from(config.notes.dir.as_ref()),
        extension: config.notes.extension.to_string(),
    };

    let report = status(&ctx, &deps, input).await?;
    print!("{}", render_report(&report));

    Ok(ExitCode::Ok)
}

fn render_report(report: &StatusReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("in sync:     {}\n", report.in_sync));
    out.push_str(&format!("local only:  {}\n", report.local_only));
    out.push_str(&format!("remote only: {}\n", report.remote_only));
    out.push_str(&format!("untracked:   {}\n", report.creatables));
    out.push_str(&format!("skipped:     {}\n", report.skipped));

    if report.conflicts.is_empty() {
        out.push_str("conflicts:   none\n");
    } else {
        out.push_str(&format!("conflicts:   {}\n", report.conflicts.len()));
        for conflict in &report.conflicts {
            out.push_str(&format!(
                "  {}  {}  ({})\n",
                conflict.id.as_str(),
                conflict.title,
                conflict.fields.join(", ")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_app::status::ConflictSummary;
    use notesync_ports::NoteId;

    #[test]
    fn report_rendering_is_stable() {
        let report = StatusReport {
            local_only: 1,
            remote_only: 2,
            in_sync: 3,
            creatables: 1,
            skipped: 0,
            conflicts: vec![ConflictSummary {
                id: NoteId::parse("7").expect("note id"),
                title: "Trip notes".to_owned(),
                fields: vec!["title".to_owned(), "content".to_owned()],
            }],
        };

        let rendered = render_report(&report);
        assert!(rendered.contains("in sync:     3\n"));
        assert!(rendered.contains("conflicts:   1\n"));
        assert!(rendered.contains("  7  Trip notes  (title, content)\n"));
    }

    #[test]
    fn empty_report_says_none() {
        let rendered = render_report(&StatusReport::default());
        assert!(rendered.contains("conflicts:   none\n"));
    }
}
