//! Version-control collaborator boundary contract.

use crate::BoxFuture;
use notesync_shared::{RequestContext, Result};

/// Working-tree cleanliness as seen by the version-control tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingTreeState {
    /// No uncommitted changes.
    Clean,
    /// Uncommitted changes exist; `summary` is a short human-readable
    /// listing suitable for display before a prompt.
    Dirty {
        /// Short status listing for display.
        summary: String,
    },
}

impl WorkingTreeState {
    /// Returns true when the tree has no uncommitted changes.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Boundary contract for the version-control collaborator.
///
/// The sync engine treats version control as opaque: it only ever asks
/// whether the tree is clean, commits everything, or hands the terminal to
/// an interactive tool. It never inspects history or individual diffs.
pub trait VcsPort: Send + Sync {
    /// Inspect the working tree of the notes directory.
    fn working_tree_state(&self, ctx: &RequestContext)
        -> BoxFuture<'_, Result<WorkingTreeState>>;

    /// Stage and commit every pending change with `message`.
    fn commit_all(&self, ctx: &RequestContext, message: String) -> BoxFuture<'_, Result<()>>;

    /// Hand the terminal to the configured interactive tool and wait for
    /// it to exit.
    fn open_interactive_tool(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_detection() {
        assert!(WorkingTreeState::Clean.is_clean());
        assert!(!WorkingTreeState::Dirty {
            summary: " M notes/a.md".to_owned(),
        }
        .is_clean());
    }
}
