//! Persisted snapshot codec.
//!
//! # Responsibility
//! - Convert the ordered note collection to and from its stored blob.
//!
//! # Invariants
//! - The blob is a JSON array of `{id, title, content, isCompleted}` in
//!   collection order.
//! - Decoding rejects nil and duplicate ids instead of repairing them. The
//!   whole blob is refused: one bad record means none of the stored notes
//!   load, and `NoteStore` then starts empty and overwrites the blob on its
//!   next save.
//! - `encode_notes` output is deterministic, so decode-then-encode yields
//!   the same bytes.

use crate::model::note::{Note, NoteId, NoteValidationError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode/decode failure for the notes blob.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    NilId { position: usize },
    DuplicateId(NoteId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid notes blob: {err}"),
            Self::NilId { position } => {
                write!(f, "note at position {position} has a nil id")
            }
            Self::DuplicateId(id) => write!(f, "duplicate note id in blob: {id}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NilId { .. } | Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes the full collection into a storage blob.
pub fn encode_notes(notes: &[Note]) -> CodecResult<Vec<u8>> {
    Ok(serde_json::to_vec(notes)?)
}

/// Parses a storage blob back into the ordered collection.
///
/// # Errors
/// - `CodecError::Json` when the blob is not a valid notes array.
/// - `CodecError::NilId` / `CodecError::DuplicateId` when identity
///   invariants do not hold.
pub fn decode_notes(blob: &[u8]) -> CodecResult<Vec<Note>> {
    let notes: Vec<Note> = serde_json::from_slice(blob)?;

    let mut seen = HashSet::with_capacity(notes.len());
    for (position, note) in notes.iter().enumerate() {
        if let Err(NoteValidationError::NilId) = note.validate() {
            return Err(CodecError::NilId { position });
        }
        if !seen.insert(note.id) {
            return Err(CodecError::DuplicateId(note.id));
        }
    }

    Ok(notes)
}
