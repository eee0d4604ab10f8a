//! App-level settings persisted next to the notes.
//!
//! # Responsibility
//! - Own the dark-mode preference and persist it under its own key.
//!
//! # Invariants
//! - A missing or unreadable value means `dark_mode == false`.
//! - The in-memory value changes even when the write fails.

use crate::codec::CodecError;
use crate::repo::kv_repo::KvRepository;
use crate::service::note_store::{StoreError, StoreResult};
use log::{error, warn};

/// Storage key holding the dark-mode flag as a JSON bool.
pub const DARK_MODE_STORAGE_KEY: &str = "isDarkMode";

/// Persisted presentation preferences.
pub struct AppSettings<R: KvRepository> {
    repo: R,
    dark_mode: bool,
}

impl<R: KvRepository> AppSettings<R> {
    /// Loads settings from `repo`, falling back to defaults on any failure.
    pub fn open(repo: R) -> Self {
        let dark_mode = match repo.get(DARK_MODE_STORAGE_KEY) {
            Ok(Some(blob)) => serde_json::from_slice::<bool>(&blob).unwrap_or_else(|err| {
                warn!(
                    "event=settings_load module=settings status=error error_code=settings_decode_failed error={err}"
                );
                false
            }),
            Ok(None) => false,
            Err(err) => {
                warn!(
                    "event=settings_load module=settings status=error error_code=settings_read_failed error={err}"
                );
                false
            }
        };
        Self { repo, dark_mode }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Sets and persists the dark-mode flag.
    ///
    /// # Errors
    /// - Returns `StoreError` when the value cannot be written; the new value
    ///   is kept in memory regardless.
    pub fn set_dark_mode(&mut self, enabled: bool) -> StoreResult<()> {
        self.dark_mode = enabled;
        let result = serde_json::to_vec(&enabled)
            .map_err(|err| StoreError::Encode(CodecError::from(err)))
            .and_then(|blob| {
                self.repo
                    .set(DARK_MODE_STORAGE_KEY, &blob)
                    .map_err(StoreError::from)
            });
        if let Err(err) = &result {
            error!(
                "event=settings_save module=settings status=error key={DARK_MODE_STORAGE_KEY} error={err}"
            );
        }
        result
    }

    /// Flips the dark-mode flag and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> StoreResult<bool> {
        let enabled = !self.dark_mode;
        self.set_dark_mode(enabled)?;
        Ok(enabled)
    }

    pub fn into_repository(self) -> R {
        self.repo
    }
}
