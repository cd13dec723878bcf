//! Terminal prompt adapter for interactive decisions.

use notesync_ports::{DecisionPort, ensure_picked_option};
use notesync_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::io::{BufRead, Write};

/// Decision adapter reading answers from the terminal.
///
/// Prompts are written to stdout and answers read line-by-line from stdin
/// on a blocking thread, so the async runtime is never parked on terminal
/// input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalDecisions;

impl TerminalDecisions {
    /// Build a terminal decision adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionPort for TerminalDecisions {
    fn confirm(&self, ctx: &RequestContext, prompt: &str) -> notesync_ports::BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        let prompt = format!("{prompt} [y/n] ");
        Box::pin(async move {
            loop {
                ctx.ensure_not_cancelled("decision.confirm")?;
                let answer = read_line_blocking(prompt.clone()).await?;
                match answer.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" => return Ok(true),
                    "n" | "no" => return Ok(false),
                    _ => {},
                }
            }
        })
    }

    fn pick_one(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        options: &[&str],
    ) -> notesync_ports::BoxFuture<'_, Result<String>> {
        let ctx = ctx.clone();
        let options: Vec<String> = options.iter().map(|&option| option.to_owned()).collect();
        let prompt = format!("{prompt} [{}] ", options.join("/"));
        Box::pin(async move {
            loop {
                ctx.ensure_not_cancelled("decision.pick_one")?;
                let answer = read_line_blocking(prompt.clone()).await?;
                let answer = answer.trim();
                let borrowed: Vec<&str> = options.iter().map(String::as_str).collect();
                if let Ok(picked) = ensure_picked_option(answer, &borrowed) {
                    return Ok(picked);
                }
                // Invalid answer; re-prompt.
            }
        })
    }
}

async fn read_line_blocking(prompt: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout();
        stdout.write_all(prompt.as_bytes()).map_err(ErrorEnvelope::from)?;
        stdout.flush().map_err(ErrorEnvelope::from)?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(ErrorEnvelope::from)?;
        if read == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::declined(),
                "input stream closed",
            ));
        }
        Ok(line)
    })
    .await
    .map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("prompt task failed: {error}"),
            ErrorClass::NonRetriable,
        )
    })?
}
