//! In-process key/value repository.
//!
//! Clones share one map, so a store can be dropped and reopened against the
//! same contents (relaunch), or two services can share one backing store.

use crate::repo::kv_repo::{KvRepository, RepoResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Map-backed repository for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvRepository {
    entries: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
