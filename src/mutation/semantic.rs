//! Semantic properties mutations

use std::collections::HashMap;

use crate::model::ContentId;
use crate::mutation::CommitResult;
use crate::store::FeedStore;

/// Semantic properties to write; one value per content id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticPropertiesChanges {
    entries: HashMap<ContentId, Vec<u8>>,
}

impl SemanticPropertiesChanges {
    pub fn get(&self, content_id: &str) -> Option<&[u8]> {
        self.entries.get(content_id).map(Vec::as_slice)
    }

    pub fn into_entries(self) -> HashMap<ContentId, Vec<u8>> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for semantic properties; the last `add` per id wins
pub struct SemanticPropertiesMutation<'a> {
    store: &'a FeedStore,
    changes: SemanticPropertiesChanges,
}

impl<'a> SemanticPropertiesMutation<'a> {
    pub(crate) fn new(store: &'a FeedStore) -> Self {
        Self {
            store,
            changes: SemanticPropertiesChanges::default(),
        }
    }

    pub fn add(mut self, content_id: impl Into<ContentId>, data: impl Into<Vec<u8>>) -> Self {
        self.changes.entries.insert(content_id.into(), data.into());
        self
    }

    pub fn finish(self) -> SemanticPropertiesChanges {
        self.changes
    }

    pub fn commit(self) -> CommitResult {
        self.store.commit_semantic_properties(self.changes)
    }
}
