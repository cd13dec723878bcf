//! Notes filesystem adapter using async IO.

use notesync_ports::{NoteFileStat, NoteFileSystemPort};
use notesync_shared::{ErrorEnvelope, NoteContextExt, RequestContext, Result};
use std::path::PathBuf;
use std::time::{Duration, UNIX_EPOCH};

/// Local notes directory adapter.
///
/// The notes directory is flat: only immediate children are considered, and
/// subdirectories are ignored without error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalNoteFileSystem;

impl LocalNoteFileSystem {
    /// Build a notes filesystem adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NoteFileSystemPort for LocalNoteFileSystem {
    fn list_note_files(
        &self,
        _ctx: &RequestContext,
        dir: PathBuf,
        extension: String,
    ) -> notesync_ports::BoxFuture<'_, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            let dir_display = dir.to_string_lossy().to_string();
            let mut read_dir = tokio::fs::read_dir(&dir)
                .await
                .map_err(ErrorEnvelope::from)
                .with_note_path(&dir_display)?;

            let mut paths = Vec::new();
            loop {
                let entry = read_dir
                    .next_entry()
                    .await
                    .map_err(ErrorEnvelope::from)
                    .with_note_path(&dir_display)?;
                let Some(entry) = entry else { break };

                let file_type = entry
                    .file_type()
                    .await
                    .map_err(ErrorEnvelope::from)
                    .with_note_path(&dir_display)?;
                if !file_type.is_file() {
                    continue;
                }
                let name = entry.file_name();
                // Extension matching is case-insensitive: Note.MD counts.
                let matches_extension = name
                    .to_str()
                    .is_some_and(|name| name.to_lowercase().ends_with(&extension.to_lowercase()));
                if matches_extension {
                    paths.push(entry.path());
                }
            }

            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            Ok(paths)
        })
    }

    fn read_to_string(
        &self,
        _ctx: &RequestContext,
        path: PathBuf,
    ) -> notesync_ports::BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            tokio::fs::read_to_string(&path)
                .await
                .map_err(ErrorEnvelope::from)
                .with_note_path(path.to_string_lossy())
        })
    }

    fn write_string(
        &self,
        _ctx: &RequestContext,
        path: PathBuf,
        contents: String,
    ) -> notesync_ports::BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            tokio::fs::write(&path, contents)
                .await
                .map_err(ErrorEnvelope::from)
                .with_note_path(path.to_string_lossy())
        })
    }

    fn remove_file(
        &self,
        _ctx: &RequestContext,
        path: PathBuf,
    ) -> notesync_ports::BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            tokio::fs::remove_file(&path)
                .await
                .map_err(ErrorEnvelope::from)
                .with_note_path(path.to_string_lossy())
        })
    }

    fn stat(
        &self,
        _ctx: &RequestContext,
        path: PathBuf,
    ) -> notesync_ports::BoxFuture<'_, Result<NoteFileStat>> {
        Box::pin(async move {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(ErrorEnvelope::from)
                .with_note_path(path.to_string_lossy())?;

            let mtime_ms = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
                .unwrap_or(Duration::from_secs(0))
                .as_millis();
            let mtime_ms = u64::try_from(mtime_ms).unwrap_or(0);

            Ok(NoteFileStat {
                size_bytes: metadata.len(),
                mtime_ms,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn lists_only_matching_immediate_files() -> Result<()> {
        let dir = tempfile::tempdir().map_err(ErrorEnvelope::from)?;
        fs::write(dir.path().join("a.md"), "# a").map_err(ErrorEnvelope::from)?;
        fs::write(dir.path().join("b.md"), "# b").map_err(ErrorEnvelope::from)?;
        fs::write(dir.path().join("notes.txt"), "skip").map_err(ErrorEnvelope::from)?;
        fs::create_dir(dir.path().join("nested.md")).map_err(ErrorEnvelope::from)?;
        fs::write(dir.path().join("nested.md").join("c.md"), "# c").map_err(ErrorEnvelope::from)?;

        let adapter = LocalNoteFileSystem::new();
        let ctx = RequestContext::new_request();
        let paths = adapter
            .list_note_files(&ctx, dir.path().to_path_buf(), ".md".to_owned())
            .await?;

        let names: Vec<_> = paths
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_is_an_error_not_empty() {
        let adapter = LocalNoteFileSystem::new();
        let ctx = RequestContext::new_request();
        let result = adapter
            .list_note_files(&ctx, PathBuf::from("/nonexistent/notes"), ".md".to_owned())
            .await;

        let error = result.expect_err("missing dir");
        assert!(error.metadata.contains_key("path"));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() -> Result<()> {
        let dir = tempfile::tempdir().map_err(ErrorEnvelope::from)?;
        let path = dir.path().join("note.md");

        let adapter = LocalNoteFileSystem::new();
        let ctx = RequestContext::new_request();
        adapter
            .write_string(&ctx, path.clone(), "---\nid: n1\n---\nbody\n".to_owned())
            .await?;
        let contents = adapter.read_to_string(&ctx, path.clone()).await?;
        assert!(contents.contains("id: n1"));

        let stat = adapter.stat(&ctx, path.clone()).await?;
        assert!(stat.size_bytes > 0);

        adapter.remove_file(&ctx, path.clone()).await?;
        assert!(adapter.read_to_string(&ctx, path).await.is_err());
        Ok(())
    }
}
