//! Core use-case services.
//!
//! # Responsibility
//! - Expose the note store and settings APIs the presentation layer binds to.
//! - Keep presentation code decoupled from storage and encoding details.

pub mod note_store;
pub mod settings;
pub mod snapshot;
