//! Disposable on-disk cache for remote note metadata listings.
//!
//! The cache is a single JSON file with a write timestamp. It only ever
//! serves reads younger than the configured freshness window, and every
//! failure (missing file, bad JSON, clock weirdness) degrades to a miss.
//! Deleting the file at any time is safe.

use notesync_ports::{
    BoxFuture, CreatableNote, NoteId, NoteMetadata, NoteRecord, RemotePort,
};
use notesync_shared::{ErrorEnvelope, RequestContext, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    timestamp_ms: u64,
    notes: Vec<NoteMetadata>,
}

/// File-backed metadata cache with a TTL.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    path: PathBuf,
    ttl: Duration,
}

impl MetadataCache {
    /// Create a cache backed by `path` with the given freshness window.
    #[must_use]
    pub const fn new(path: PathBuf, ttl_secs: u64) -> Self {
        Self {
            path,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Return the cached listing if it is still fresh, `None` otherwise.
    pub async fn load_fresh(&self) -> Option<Vec<NoteMetadata>> {
        let raw = tokio::fs::read(&self.path).await.ok()?;
        let parsed: CacheFile = serde_json::from_slice(&raw).ok()?;

        let now_ms = now_epoch_ms();
        let age_ms = now_ms.checked_sub(parsed.timestamp_ms)?;
        let ttl_ms = u64::try_from(self.ttl.as_millis()).ok()?;
        if age_ms > ttl_ms {
            return None;
        }
        Some(parsed.notes)
    }

    /// Persist a fresh listing, stamping it with the current time.
    pub async fn store(&self, notes: Vec<NoteMetadata>) -> Result<()> {
        let file = CacheFile {
            timestamp_ms: now_epoch_ms(),
            notes,
        };
        let encoded = serde_json::to_vec_pretty(&file).map_err(|error| {
            ErrorEnvelope::unexpected(
                notesync_shared::ErrorCode::io(),
                format!("failed to encode metadata cache: {error}"),
                notesync_shared::ErrorClass::NonRetriable,
            )
        })?;
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(ErrorEnvelope::from)
    }

    /// Drop the cache file; missing files are not an error.
    pub async fn invalidate(&self) {
        let _ = tokio::fs::remove_file(&self.path).await;
    }
}

/// Remote store decorator that serves metadata listings from the cache.
///
/// Only `get_all_notes_metadata` is cached. Writes invalidate the cache so
/// the next listing reflects them; cache persistence failures degrade to
/// uncached behavior instead of failing the request.
pub struct CachedRemote {
    inner: Arc<dyn RemotePort>,
    cache: MetadataCache,
}

impl CachedRemote {
    /// Wrap `inner` with a metadata cache.
    #[must_use]
    pub const fn new(inner: Arc<dyn RemotePort>, cache: MetadataCache) -> Self {
        Self { inner, cache }
    }
}

impl RemotePort for CachedRemote {
    fn get_all_notes(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<NoteRecord>>> {
        self.inner.get_all_notes(ctx)
    }

    fn get_all_notes_metadata(
        &self,
        ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<Vec<NoteMetadata>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            if let Some(notes) = self.cache.load_fresh().await {
                return Ok(notes);
            }
            let notes = self.inner.get_all_notes_metadata(&ctx).await?;
            let _ = self.cache.store(notes.clone()).await;
            Ok(notes)
        })
    }

    fn get_note_by_id(
        &self,
        ctx: &RequestContext,
        id: NoteId,
    ) -> BoxFuture<'_, Result<Option<NoteRecord>>> {
        self.inner.get_note_by_id(ctx, id)
    }

    fn create_note(
        &self,
        ctx: &RequestContext,
        note: CreatableNote,
    ) -> BoxFuture<'_, Result<NoteRecord>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let record = self.inner.create_note(&ctx, note).await?;
            self.cache.invalidate().await;
            Ok(record)
        })
    }

    fn update_note(
        &self,
        ctx: &RequestContext,
        id: NoteId,
        note: NoteRecord,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.inner.update_note(&ctx, id, note).await?;
            self.cache.invalidate().await;
            Ok(())
        })
    }

    fn disconnect(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<()>> {
        self.inner.disconnect(ctx)
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}
