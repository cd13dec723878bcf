//! Remote note store boundary contract.

use crate::BoxFuture;
use notesync_domain::{CreatableNote, NoteId, NoteMetadata, NoteRecord};
use notesync_shared::{RequestContext, Result};

/// Boundary contract for the remote note store.
///
/// The store is assumed to provide strong read-after-write consistency for
/// a single client: a record listed right after `create_note` or
/// `update_note` reflects that write. Ids are assigned by the store on
/// create and never by the caller.
pub trait RemotePort: Send + Sync {
    /// Fetch every note, including bodies.
    fn get_all_notes(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<NoteRecord>>>;

    /// Fetch every note's metadata (no bodies), for lighter listing.
    fn get_all_notes_metadata(
        &self,
        ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<Vec<NoteMetadata>>>;

    /// Fetch a single note by id, or `None` when the id is unknown.
    fn get_note_by_id(
        &self,
        ctx: &RequestContext,
        id: NoteId,
    ) -> BoxFuture<'_, Result<Option<NoteRecord>>>;

    /// Create a note; the store assigns and returns the new id.
    fn create_note(
        &self,
        ctx: &RequestContext,
        note: CreatableNote,
    ) -> BoxFuture<'_, Result<NoteRecord>>;

    /// Overwrite the remote record for `id` with `note`.
    fn update_note(
        &self,
        ctx: &RequestContext,
        id: NoteId,
        note: NoteRecord,
    ) -> BoxFuture<'_, Result<()>>;

    /// Release the connection; called exactly once at the end of a run.
    fn disconnect(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<()>>;
}
