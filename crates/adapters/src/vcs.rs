//! Git command-line adapter for the version-control port.

use notesync_ports::{VcsPort, WorkingTreeState};
use notesync_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Version-control adapter shelling out to `git`.
///
/// Git is treated as opaque: the adapter only reads porcelain status,
/// stages-and-commits everything, or hands the terminal to an interactive
/// tool. It never parses history.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    interactive_tool: Box<str>,
}

impl GitCli {
    /// Create a git adapter rooted at the notes repository directory.
    #[must_use]
    pub const fn new(repo_dir: PathBuf, interactive_tool: Box<str>) -> Self {
        Self {
            repo_dir,
            interactive_tool,
        }
    }

    async fn run_git(&self, ctx: &RequestContext, args: &[&str]) -> Result<String> {
        ctx.ensure_not_cancelled("vcs.git")?;

        let output = tokio::select! {
            () = ctx.cancelled() => {
                return Err(ErrorEnvelope::cancelled("operation cancelled")
                    .with_metadata("operation", "vcs.git"));
            },
            result = Command::new("git")
                .args(args)
                .current_dir(&self.repo_dir)
                .stdin(Stdio::null())
                .output() => result.map_err(|error| spawn_error("git", &error))?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ErrorEnvelope::unexpected(
                ErrorCode::new("vcs", "git_failed"),
                format!("git {} failed: {stderr}", args.first().unwrap_or(&"")),
                ErrorClass::NonRetriable,
            )
            .with_metadata("exit_code", exit_code_string(output.status.code())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VcsPort for GitCli {
    fn working_tree_state(
        &self,
        ctx: &RequestContext,
    ) -> notesync_ports::BoxFuture<'_, Result<WorkingTreeState>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let stdout = self.run_git(&ctx, &["status", "--porcelain"]).await?;
            if stdout.trim().is_empty() {
                Ok(WorkingTreeState::Clean)
            } else {
                Ok(WorkingTreeState::Dirty {
                    summary: stdout.trim_end().to_owned(),
                })
            }
        })
    }

    fn commit_all(
        &self,
        ctx: &RequestContext,
        message: String,
    ) -> notesync_ports::BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.run_git(&ctx, &["add", "-A"]).await?;
            self.run_git(&ctx, &["commit", "-m", message.as_str()]).await?;
            Ok(())
        })
    }

    fn open_interactive_tool(
        &self,
        ctx: &RequestContext,
    ) -> notesync_ports::BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("vcs.interactive_tool")?;

            // The tool owns the terminal until it exits; no cancellation race
            // here because the user is driving it directly.
            let status = Command::new(self.interactive_tool.as_ref())
                .current_dir(&self.repo_dir)
                .status()
                .await
                .map_err(|error| spawn_error(self.interactive_tool.as_ref(), &error))?;

            if !status.success() {
                return Err(ErrorEnvelope::unexpected(
                    ErrorCode::new("vcs", "interactive_tool_failed"),
                    format!("{} exited with failure", self.interactive_tool),
                    ErrorClass::NonRetriable,
                )
                .with_metadata("exit_code", exit_code_string(status.code())));
            }
            Ok(())
        })
    }
}

fn spawn_error(program: &str, error: &std::io::Error) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("vcs", "spawn_failed"),
        format!("failed to run {program}: {error}"),
        ErrorClass::NonRetriable,
    )
    .with_metadata("program", program.to_owned())
}

fn exit_code_string(code: Option<i32>) -> String {
    code.map_or_else(|| "signal".to_owned(), |code| code.to_string())
}
