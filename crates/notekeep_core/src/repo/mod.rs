//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key/value blob contract used by the note store and settings.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes are synchronous and complete before the call returns.
//! - A key holds at most one blob; `set` replaces it wholesale.

pub mod kv_repo;
pub mod memory_repo;
