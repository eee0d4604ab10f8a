//! Note domain model.
//!
//! # Responsibility
//! - Define the single record type owned by the note store.
//! - Provide identity helpers for create and restore paths.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - `id` is never the nil UUID.
//! - New notes start with `is_completed == false`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for one note.
pub type NoteId = Uuid;

/// Validation error for note identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// The nil UUID cannot identify a note.
    NilId,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "note id must not be the nil uuid"),
        }
    }
}

impl Error for NoteValidationError {}

/// User-authored note with a completion flag.
///
/// Serialized field names follow the persisted blob layout
/// (`id`, `title`, `content`, `isCompleted`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Stable id assigned at creation.
    pub id: NoteId,
    /// Free-form title. Empty is allowed.
    pub title: String,
    /// Free-form body text. Empty is allowed.
    pub content: String,
    /// Completion flag toggled by the user.
    #[serde(rename = "isCompleted")]
    pub is_completed: bool,
}

impl Note {
    /// Creates an incomplete note with a fresh v4 id.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            is_completed: false,
        }
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by restore/import paths where identity already exists.
    ///
    /// # Errors
    /// - Returns `NoteValidationError::NilId` for the nil UUID.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        is_completed: bool,
    ) -> Result<Self, NoteValidationError> {
        let note = Self {
            id,
            title: title.into(),
            content: content.into(),
            is_completed,
        };
        note.validate()?;
        Ok(note)
    }

    /// Checks the identity invariant.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        Ok(())
    }

    /// Returns a single-line preview of `content` for list rows.
    ///
    /// Whitespace runs collapse to one space; text longer than `max_chars`
    /// is cut and suffixed with `...`. Blank content or `max_chars == 0`
    /// yields `None`.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        if max_chars == 0 {
            return None;
        }
        let collapsed = WHITESPACE_RE.replace_all(self.content.as_str(), " ");
        let trimmed = collapsed.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut preview = trimmed.chars().take(max_chars).collect::<String>();
        if trimmed.chars().count() > max_chars {
            preview.push_str("...");
        }
        Some(preview)
    }
}
