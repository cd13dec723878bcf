//! Hand-written test doubles shared by the use-case tests.

use notesync_domain::{CreatableNote, NoteId, NoteMetadata, NoteRecord};
use notesync_ports::{
    BoxFuture, DecisionPort, LogEvent, LogFields, LoggerPort, NoteFileStat, NoteFileSystemPort,
    RemotePort, VcsPort, WorkingTreeState, ensure_picked_option,
};
use notesync_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fixed modification time used by the in-memory filesystem (2024-01-01).
pub const TEST_MTIME_MS: u64 = 1_704_067_200_000;

/// In-memory notes directory.
#[derive(Default)]
pub struct InMemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
    fail_listing: bool,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_listing() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            fail_listing: true,
        }
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .lock()
            .expect("files lock")
            .insert(path.into(), content.into());
    }

    pub fn contents(&self) -> BTreeMap<PathBuf, String> {
        self.files.lock().expect("files lock").clone()
    }
}

impl NoteFileSystemPort for InMemoryFileSystem {
    fn list_note_files(
        &self,
        _ctx: &RequestContext,
        dir: PathBuf,
        extension: String,
    ) -> BoxFuture<'_, Result<Vec<PathBuf>>> {
        let fail = self.fail_listing;
        let paths: Vec<PathBuf> = self
            .files
            .lock()
            .expect("files lock")
            .keys()
            .filter(|path| {
                path.parent() == Some(dir.as_path())
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.to_lowercase().ends_with(&extension))
            })
            .cloned()
            .collect();
        Box::pin(async move {
            if fail {
                return Err(ErrorEnvelope::unexpected(
                    ErrorCode::io(),
                    "cannot list notes directory",
                    ErrorClass::NonRetriable,
                ));
            }
            Ok(paths)
        })
    }

    fn read_to_string(&self, _ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<String>> {
        let content = self.files.lock().expect("files lock").get(&path).cloned();
        Box::pin(async move {
            content.ok_or_else(|| {
                ErrorEnvelope::expected(ErrorCode::not_found(), "no such note file")
            })
        })
    }

    fn write_string(
        &self,
        _ctx: &RequestContext,
        path: PathBuf,
        contents: String,
    ) -> BoxFuture<'_, Result<()>> {
        self.files.lock().expect("files lock").insert(path, contents);
        Box::pin(async move { Ok(()) })
    }

    fn remove_file(&self, _ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<()>> {
        let removed = self.files.lock().expect("files lock").remove(&path);
        Box::pin(async move {
            removed.map(|_| ()).ok_or_else(|| {
                ErrorEnvelope::expected(ErrorCode::not_found(), "no such note file")
            })
        })
    }

    fn stat(&self, _ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<NoteFileStat>> {
        let size = self
            .files
            .lock()
            .expect("files lock")
            .get(&path)
            .map(|content| content.len() as u64);
        Box::pin(async move {
            size.map(|size_bytes| NoteFileStat {
                size_bytes,
                mtime_ms: TEST_MTIME_MS,
            })
            .ok_or_else(|| ErrorEnvelope::expected(ErrorCode::not_found(), "no such note file"))
        })
    }
}

/// In-memory remote note store assigning `r<n>` ids.
#[derive(Default)]
pub struct InMemoryRemote {
    notes: Mutex<BTreeMap<String, NoteRecord>>,
    next_id: AtomicU64,
    pub updates: AtomicUsize,
    pub creates: AtomicUsize,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    pub fn seed(&self, note: NoteRecord) {
        self.notes
            .lock()
            .expect("notes lock")
            .insert(note.id.as_str().to_owned(), note);
    }

    pub fn records(&self) -> Vec<NoteRecord> {
        self.notes.lock().expect("notes lock").values().cloned().collect()
    }
}

impl RemotePort for InMemoryRemote {
    fn get_all_notes(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<NoteRecord>>> {
        let notes = self.records();
        Box::pin(async move { Ok(notes) })
    }

    fn get_all_notes_metadata(
        &self,
        _ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<Vec<NoteMetadata>>> {
        let metadata: Vec<NoteMetadata> = self.records().iter().map(NoteMetadata::from).collect();
        Box::pin(async move { Ok(metadata) })
    }

    fn get_note_by_id(
        &self,
        _ctx: &RequestContext,
        id: NoteId,
    ) -> BoxFuture<'_, Result<Option<NoteRecord>>> {
        let note = self.notes.lock().expect("notes lock").get(id.as_str()).cloned();
        Box::pin(async move { Ok(note) })
    }

    fn create_note(
        &self,
        _ctx: &RequestContext,
        note: CreatableNote,
    ) -> BoxFuture<'_, Result<NoteRecord>> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = NoteId::parse(format!("r{n}")).expect("generated id");
        let record = NoteRecord {
            id,
            title: note.title,
            content: note.content,
            date: note.date,
            updated_at: "2024-01-02T00:00:00Z".to_owned(),
            tags: note.tags,
            published: false,
            extra: note.extra,
        };
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.seed(record.clone());
        Box::pin(async move { Ok(record) })
    }

    fn update_note(
        &self,
        _ctx: &RequestContext,
        id: NoteId,
        note: NoteRecord,
    ) -> BoxFuture<'_, Result<()>> {
        let mut notes = self.notes.lock().expect("notes lock");
        let known = notes.contains_key(id.as_str());
        if known {
            notes.insert(id.as_str().to_owned(), note);
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
        Box::pin(async move {
            if known {
                Ok(())
            } else {
                Err(ErrorEnvelope::expected(
                    ErrorCode::not_found(),
                    "unknown note id",
                ))
            }
        })
    }

    fn disconnect(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { Ok(()) })
    }
}

/// A queued decision answer.
pub enum Answer {
    Confirm(bool),
    Pick(&'static str),
}

/// Decision source replaying a scripted answer queue.
///
/// With `accept_when_empty`, an exhausted queue answers yes / first option,
/// which keeps happy-path tests short.
pub struct ScriptedDecisions {
    answers: Mutex<VecDeque<Answer>>,
    accept_when_empty: bool,
}

impl ScriptedDecisions {
    pub fn script(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            accept_when_empty: false,
        }
    }

    pub fn accept_all() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            accept_when_empty: true,
        }
    }
}

impl DecisionPort for ScriptedDecisions {
    fn confirm(&self, _ctx: &RequestContext, _prompt: &str) -> BoxFuture<'_, Result<bool>> {
        let next = self.answers.lock().expect("answers lock").pop_front();
        let accept_when_empty = self.accept_when_empty;
        Box::pin(async move {
            match next {
                Some(Answer::Confirm(value)) => Ok(value),
                Some(Answer::Pick(_)) => panic!("scripted a pick where a confirm was asked"),
                None if accept_when_empty => Ok(true),
                None => panic!("decision script exhausted"),
            }
        })
    }

    fn pick_one(
        &self,
        _ctx: &RequestContext,
        _prompt: &str,
        options: &[&str],
    ) -> BoxFuture<'_, Result<String>> {
        let next = self.answers.lock().expect("answers lock").pop_front();
        let accept_when_empty = self.accept_when_empty;
        let picked = match next {
            Some(Answer::Pick(value)) => ensure_picked_option(value, options),
            Some(Answer::Confirm(_)) => panic!("scripted a confirm where a pick was asked"),
            None if accept_when_empty => {
                Ok(options.first().expect("non-empty options").to_string())
            },
            None => panic!("decision script exhausted"),
        };
        Box::pin(async move { picked })
    }
}

/// Version-control double replaying a queue of working-tree states.
#[derive(Default)]
pub struct ScriptedVcs {
    states: Mutex<VecDeque<WorkingTreeState>>,
    pub commits: AtomicUsize,
    pub tool_opens: AtomicUsize,
}

impl ScriptedVcs {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn with_states(states: Vec<WorkingTreeState>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            ..Self::default()
        }
    }
}

impl VcsPort for ScriptedVcs {
    fn working_tree_state(
        &self,
        _ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<WorkingTreeState>> {
        let state = self
            .states
            .lock()
            .expect("states lock")
            .pop_front()
            .unwrap_or(WorkingTreeState::Clean);
        Box::pin(async move { Ok(state) })
    }

    fn commit_all(&self, _ctx: &RequestContext, _message: String) -> BoxFuture<'_, Result<()>> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(()) })
    }

    fn open_interactive_tool(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<()>> {
        self.tool_opens.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(()) })
    }
}

/// Logger double collecting events in memory.
#[derive(Clone, Default)]
pub struct MemoryLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl LoggerPort for MemoryLogger {
    fn log(&self, event: LogEvent) {
        self.events.lock().expect("events lock").push(event);
    }

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(self.clone())
    }
}

/// A fully tracked note record for fixtures.
pub fn tracked_note(id: &str, title: &str, content: &str) -> NoteRecord {
    NoteRecord {
        id: NoteId::parse(id).expect("note id"),
        title: title.to_owned(),
        content: content.to_owned(),
        date: "2024-01-01".to_owned(),
        updated_at: "2024-01-02T00:00:00Z".to_owned(),
        tags: Vec::new(),
        published: false,
        extra: BTreeMap::new(),
    }
}
