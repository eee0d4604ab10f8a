//! Note domain model.
//!
//! # Responsibility
//! - Define the data structures owned by the note store.
//!
//! # Invariants
//! - Every note is identified by a stable, non-nil `NoteId`.
//! - Notes are a flat collection with no cross references.

pub mod note;
