//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Attach note-locating context (path, id, title) to an error result.
///
/// The sync engine promises that every skipped or aborted action can be
/// traced back to the affected note, so error paths thread this metadata
/// through instead of formatting it into the message.
pub trait NoteContextExt<T> {
    /// Attach the local file path of the affected note.
    fn with_note_path(self, path: impl AsRef<str>) -> Result<T>;

    /// Attach the note id of the affected note.
    fn with_note_id(self, id: impl AsRef<str>) -> Result<T>;

    /// Attach the note title of the affected note.
    fn with_note_title(self, title: impl AsRef<str>) -> Result<T>;
}

impl<T> NoteContextExt<T> for Result<T> {
    fn with_note_path(self, path: impl AsRef<str>) -> Result<T> {
        self.map_err(|error| error.with_metadata("path", path.as_ref()))
    }

    fn with_note_id(self, id: impl AsRef<str>) -> Result<T> {
        self.map_err(|error| error.with_metadata("noteId", id.as_ref()))
    }

    fn with_note_title(self, title: impl AsRef<str>) -> Result<T> {
        self.map_err(|error| error.with_metadata("title", title.as_ref()))
    }
}
