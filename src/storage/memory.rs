//! In-memory content storage
//!
//! BTreeMap behind a RwLock. Used by tests and by hosts that want a
//! persistent-mode store without touching disk.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::error::Result;

use super::{apply_operations, lookup, scan_prefix, ContentStorage, ContentStorageMutation};

/// Content storage held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryContentStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryContentStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ContentStorage for InMemoryContentStorage {
    fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        Ok(lookup(&self.entries.read(), keys))
    }

    fn get_all(&self, prefix: &str) -> Result<HashMap<String, Vec<u8>>> {
        Ok(scan_prefix(&self.entries.read(), prefix))
    }

    fn get_all_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn commit(&self, mutation: ContentStorageMutation) -> Result<()> {
        // One write lock for the whole batch keeps it atomic to readers
        let mut entries = self.entries.write();
        apply_operations(&mut entries, mutation.operations());
        Ok(())
    }
}
