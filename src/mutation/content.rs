//! Content (payload) mutations

use crate::model::{ContentId, Payload};
use crate::mutation::CommitResult;
use crate::store::FeedStore;

/// Payloads to write, in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChanges {
    entries: Vec<(ContentId, Payload)>,
}

impl ContentChanges {
    pub fn entries(&self) -> &[(ContentId, Payload)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(ContentId, Payload)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for payload writes.
///
/// Shared state payloads are keyed by their own embedded content id, not
/// by the id passed to [`add`](Self::add).
pub struct ContentMutation<'a> {
    store: &'a FeedStore,
    changes: ContentChanges,
}

impl<'a> ContentMutation<'a> {
    pub(crate) fn new(store: &'a FeedStore) -> Self {
        Self {
            store,
            changes: ContentChanges::default(),
        }
    }

    pub fn add(mut self, content_id: impl Into<ContentId>, payload: Payload) -> Self {
        self.changes.entries.push((content_id.into(), payload));
        self
    }

    pub fn finish(self) -> ContentChanges {
        self.changes
    }

    pub fn commit(self) -> CommitResult {
        self.store.commit_content(self.changes)
    }
}
