//! In-memory journal storage

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::Result;

use super::{apply_mutation, JournalMutation, JournalStorage};

/// Journal storage held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryJournalStorage {
    journals: RwLock<BTreeMap<String, Vec<Vec<u8>>>>,
}

impl InMemoryJournalStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JournalStorage for InMemoryJournalStorage {
    fn read(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        Ok(self.journals.read().get(name).cloned().unwrap_or_default())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.journals.read().contains_key(name))
    }

    fn get_all_journals(&self) -> Result<Vec<String>> {
        Ok(self.journals.read().keys().cloned().collect())
    }

    fn commit(&self, mutation: JournalMutation) -> Result<()> {
        let mut journals = self.journals.write();
        apply_mutation(&mut journals, &mutation);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.journals.write().clear();
        Ok(())
    }
}
