//! Core domain logic for NoteKeep.
//! This crate owns the note collection, its persistence and its observers.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::{decode_notes, encode_notes, CodecError, CodecResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::memory_repo::MemoryKvRepository;
pub use service::note_store::{
    NoteSelection, NoteStore, StoreError, StoreResult, NOTES_STORAGE_KEY,
};
pub use service::settings::{AppSettings, DARK_MODE_STORAGE_KEY};
pub use service::snapshot::{NoteSnapshot, SubscriptionId};
