//! Interactive decision source boundary contract.

use crate::BoxFuture;
use notesync_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};

/// Boundary contract for human yes/no and multiple-choice decisions.
///
/// The orchestrator never proceeds past a pause point without a concrete
/// answer; implementations block (asynchronously) until one is available.
pub trait DecisionPort: Send + Sync {
    /// Ask a yes/no question.
    fn confirm(&self, ctx: &RequestContext, prompt: &str) -> BoxFuture<'_, Result<bool>>;

    /// Ask the user to pick exactly one of `options`.
    ///
    /// Implementations MUST return a value drawn from `options`; use
    /// [`ensure_picked_option`] to enforce the contract at the boundary.
    fn pick_one(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        options: &[&str],
    ) -> BoxFuture<'_, Result<String>>;
}

/// Validate that a picked answer is one of the offered options.
pub fn ensure_picked_option(answer: &str, options: &[&str]) -> Result<String> {
    if options.contains(&answer) {
        return Ok(answer.to_owned());
    }
    Err(ErrorEnvelope::invariant(
        ErrorCode::invalid_input(),
        format!("decision source returned '{answer}', not one of the offered options"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_option_must_be_offered() {
        let options = ["commit", "exit"];
        assert!(ensure_picked_option("commit", &options).is_ok());
        assert!(ensure_picked_option("retry", &options).is_err());
    }
}
