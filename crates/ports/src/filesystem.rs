//! Notes directory boundary contract.

use crate::BoxFuture;
use notesync_shared::{RequestContext, Result};
use std::path::PathBuf;

/// File metadata for a note file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteFileStat {
    /// Size in bytes.
    pub size_bytes: u64,
    /// Modification time as milliseconds since epoch.
    pub mtime_ms: u64,
}

/// Boundary contract for the notes directory on disk.
///
/// The directory is flat: only immediate children are note files, and
/// subdirectories are never descended into. All paths are absolute and
/// owned by the composition root.
pub trait NoteFileSystemPort: Send + Sync {
    /// List immediate files of `dir` whose name ends with `extension`.
    ///
    /// Returned paths are absolute and sorted by file name. A missing or
    /// unreadable directory is a fatal error, not an empty listing.
    fn list_note_files(
        &self,
        ctx: &RequestContext,
        dir: PathBuf,
        extension: String,
    ) -> BoxFuture<'_, Result<Vec<PathBuf>>>;

    /// Read a UTF-8 note file.
    fn read_to_string(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<String>>;

    /// Write a note file, replacing any previous contents.
    fn write_string(
        &self,
        ctx: &RequestContext,
        path: PathBuf,
        contents: String,
    ) -> BoxFuture<'_, Result<()>>;

    /// Delete a note file.
    fn remove_file(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<()>>;

    /// Read size and modification time for a note file.
    fn stat(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<NoteFileStat>>;
}
