//! Storage Module
//!
//! Key/value content storage consumed by the store.
//!
//! ## Responsibilities
//! - Point reads, prefix scans and key listing
//! - Atomic multi-key commits (upsert / delete / delete-all)
//!
//! ## Backends
//! - [`InMemoryContentStorage`] -- ordered map, nothing persisted
//! - [`FileContentStorage`] -- ordered map replayed from an append-only
//!   commit log

mod file;
mod memory;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use file::{FileContentStorage, ReplayResult, SNAPSHOT_CHUNK_BYTES};
pub use memory::InMemoryContentStorage;

/// Key/value byte-blob storage.
///
/// Implementations must apply a [`ContentStorageMutation`] all-or-nothing.
pub trait ContentStorage: Send + Sync {
    /// Values for the keys that exist; missing keys are omitted
    fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>>;

    /// Every entry whose key starts with `prefix`
    fn get_all(&self, prefix: &str) -> Result<HashMap<String, Vec<u8>>>;

    /// Every key in the storage
    fn get_all_keys(&self) -> Result<Vec<String>>;

    /// Apply a mutation atomically
    fn commit(&self, mutation: ContentStorageMutation) -> Result<()>;
}

/// One change inside a content storage commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentOperation {
    /// Insert or replace a value
    Upsert { key: String, value: Vec<u8> },

    /// Remove a key (no-op if absent)
    Delete { key: String },

    /// Remove every key
    DeleteAll,
}

/// Ordered list of operations committed together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentStorageMutation {
    operations: Vec<ContentOperation>,
}

impl ContentStorageMutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.push(ContentOperation::Upsert {
            key: key.into(),
            value,
        });
        self
    }

    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.push(ContentOperation::Delete { key: key.into() });
        self
    }

    pub fn delete_all(mut self) -> Self {
        self.push(ContentOperation::DeleteAll);
        self
    }

    pub fn push(&mut self, operation: ContentOperation) {
        self.operations.push(operation);
    }

    pub fn operations(&self) -> &[ContentOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<ContentOperation> {
        self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// =============================================================================
// Shared helpers (used by both backends)
// =============================================================================

pub(crate) fn apply_operations(map: &mut BTreeMap<String, Vec<u8>>, operations: &[ContentOperation]) {
    for operation in operations {
        match operation {
            ContentOperation::Upsert { key, value } => {
                map.insert(key.clone(), value.clone());
            }
            ContentOperation::Delete { key } => {
                map.remove(key);
            }
            ContentOperation::DeleteAll => map.clear(),
        }
    }
}

pub(crate) fn lookup(map: &BTreeMap<String, Vec<u8>>, keys: &[String]) -> HashMap<String, Vec<u8>> {
    keys.iter()
        .filter_map(|key| map.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}

pub(crate) fn scan_prefix(map: &BTreeMap<String, Vec<u8>>, prefix: &str) -> HashMap<String, Vec<u8>> {
    map.range(prefix.to_string()..)
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
