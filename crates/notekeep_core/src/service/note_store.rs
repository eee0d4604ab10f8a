//! Note store: the owning manager of the note collection.
//!
//! # Responsibility
//! - Own the authoritative ordered list of notes and mediate every mutation.
//! - Persist the full collection after each successful mutation.
//! - Publish an immutable snapshot to observers after each successful mutation.
//!
//! # Invariants
//! - Note ids are unique within the collection at all times.
//! - Lookup misses are silent no-ops: nothing is saved or published.
//! - Load and save failures are logged and absorbed, never returned.
//! - Persistence runs before publication, both before the mutating call returns.

use crate::codec::{decode_notes, encode_notes, CodecError};
use crate::model::note::{Note, NoteId};
use crate::repo::kv_repo::{KvRepository, RepoError};
use crate::service::snapshot::{NoteSnapshot, SubscriberSet, SubscriptionId};
use log::{debug, error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// Storage key holding the encoded note collection.
pub const NOTES_STORAGE_KEY: &str = "notesData";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while writing store state to persistent storage.
#[derive(Debug)]
pub enum StoreError {
    /// State could not be serialized.
    Encode(CodecError),
    /// Serialized state could not be written.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode store state: {err}"),
            Self::Repo(err) => write!(f, "failed to write store state: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Encode(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Notes targeted by `NoteStore::delete_notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSelection {
    /// Positions in the current ordered collection.
    ///
    /// Duplicates and out-of-range positions are ignored.
    Positions(Vec<usize>),
    /// Note ids. Unknown ids are ignored.
    Ids(Vec<NoteId>),
}

impl NoteSelection {
    pub fn position(position: usize) -> Self {
        Self::Positions(vec![position])
    }

    pub fn id(id: NoteId) -> Self {
        Self::Ids(vec![id])
    }
}

/// Owning manager of the note collection.
///
/// Construct one per storage location and pass it by reference to whatever
/// presentation code needs it.
pub struct NoteStore<R: KvRepository> {
    repo: R,
    notes: Vec<Note>,
    subscribers: SubscriberSet,
    last_save_error: Option<StoreError>,
}

impl<R: KvRepository> NoteStore<R> {
    /// Creates the store and restores the collection from `repo`.
    ///
    /// An absent or empty blob yields an empty collection. An unreadable or
    /// undecodable blob (including one with a duplicate or nil id) is logged
    /// and also yields an empty collection; the stored blob is left untouched
    /// until the next successful save, which replaces it and drops the notes
    /// it held.
    pub fn open(repo: R) -> Self {
        let notes = load_notes(&repo);
        Self {
            repo,
            notes,
            subscribers: SubscriberSet::default(),
            last_save_error: None,
        }
    }

    /// Current ordered collection.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Immutable copy of the current collection.
    pub fn snapshot(&self) -> NoteSnapshot {
        NoteSnapshot::new(&self.notes)
    }

    /// Looks up one note for detail views.
    pub fn get_note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn position_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Releases the backing repository.
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Error from the most recent save, cleared by the next successful one.
    ///
    /// While set, persisted state may lag behind `notes()`.
    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    /// Registers a callback invoked with every new snapshot.
    pub fn subscribe(&mut self, callback: impl FnMut(&NoteSnapshot) + 'static) -> SubscriptionId {
        self.subscribers.add_callback(callback)
    }

    /// Registers a channel receiving every new snapshot.
    ///
    /// Dropping the receiver unsubscribes on the next publish.
    pub fn subscribe_channel(&mut self) -> Receiver<NoteSnapshot> {
        let (_, rx) = self.subscribers.add_channel();
        rx
    }

    /// Removes a callback subscription. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Appends a new incomplete note and returns its id.
    pub fn add_note(&mut self, title: impl Into<String>, content: impl Into<String>) -> NoteId {
        let note = Note::new(title, content);
        let id = note.id;
        self.notes.push(note);
        self.commit("note_add");
        id
    }

    /// Replaces title and content of the note with `id`.
    ///
    /// Id, position and completion flag are preserved. Returns `false` and
    /// does nothing when no note matches.
    pub fn update_note(
        &mut self,
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_update module=store status=noop reason=not_found");
            return false;
        };
        note.title = title.into();
        note.content = content.into();
        self.commit("note_update");
        true
    }

    /// Flips the completion flag of the note with `id`.
    ///
    /// Returns `false` and does nothing when no note matches.
    pub fn toggle_completion(&mut self, id: NoteId) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_toggle module=store status=noop reason=not_found");
            return false;
        };
        note.is_completed = !note.is_completed;
        self.commit("note_toggle");
        true
    }

    /// Removes the selected notes, keeping the order of the rest.
    ///
    /// Returns how many notes were removed. Nothing is saved or published
    /// when the selection matches no note.
    pub fn delete_notes(&mut self, selection: NoteSelection) -> usize {
        let before = self.notes.len();
        match selection {
            NoteSelection::Positions(positions) => {
                let targets = positions
                    .into_iter()
                    .filter(|position| *position < before)
                    .collect::<HashSet<_>>();
                let mut position = 0;
                self.notes.retain(|_| {
                    let keep = !targets.contains(&position);
                    position += 1;
                    keep
                });
            }
            NoteSelection::Ids(ids) => {
                let targets = ids.into_iter().collect::<HashSet<_>>();
                self.notes.retain(|note| !targets.contains(&note.id));
            }
        }

        let removed = before - self.notes.len();
        if removed == 0 {
            debug!("event=notes_delete module=store status=noop reason=not_found");
            return 0;
        }
        self.commit("notes_delete");
        removed
    }

    fn commit(&mut self, event: &'static str) {
        self.save();
        let snapshot = self.snapshot();
        let delivered = self.subscribers.publish(&snapshot);
        debug!(
            "event={event} module=store status=ok count={} subscribers={delivered}",
            snapshot.len()
        );
    }

    fn save(&mut self) {
        let started_at = Instant::now();
        match self.write_notes() {
            Ok(bytes) => {
                self.last_save_error = None;
                debug!(
                    "event=notes_save module=store status=ok count={} bytes={bytes} duration_ms={}",
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                let error_code = match err {
                    StoreError::Encode(_) => "notes_encode_failed",
                    StoreError::Repo(_) => "notes_write_failed",
                };
                error!(
                    "event=notes_save module=store status=error count={} duration_ms={} error_code={error_code} error={err}",
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
                self.last_save_error = Some(err);
            }
        }
    }

    fn write_notes(&self) -> StoreResult<usize> {
        let blob = encode_notes(&self.notes)?;
        self.repo.set(NOTES_STORAGE_KEY, &blob)?;
        Ok(blob.len())
    }
}

fn load_notes<R: KvRepository>(repo: &R) -> Vec<Note> {
    let started_at = Instant::now();
    let blob = match repo.get(NOTES_STORAGE_KEY) {
        Ok(Some(blob)) if !blob.is_empty() => blob,
        Ok(_) => {
            info!("event=notes_load module=store status=empty");
            return Vec::new();
        }
        Err(err) => {
            error!(
                "event=notes_load module=store status=error error_code=notes_read_failed error={err}"
            );
            return Vec::new();
        }
    };

    match decode_notes(&blob) {
        Ok(notes) => {
            info!(
                "event=notes_load module=store status=ok count={} bytes={} duration_ms={}",
                notes.len(),
                blob.len(),
                started_at.elapsed().as_millis()
            );
            notes
        }
        Err(err) => {
            error!(
                "event=notes_load module=store status=error bytes={} error_code=notes_decode_failed error={err}",
                blob.len()
            );
            Vec::new()
        }
    }
}
