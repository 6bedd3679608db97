//! Uploadable action mutations
//!
//! Within one builder the last call for an (action, content id) pair wins:
//! a `remove` cancels an earlier `upsert` of the same action and vice versa.

use std::collections::{HashMap, HashSet};

use crate::model::{ContentId, UploadableAction};
use crate::mutation::CommitResult;
use crate::store::FeedStore;

/// Net upserts and removes for one content id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSets {
    pub upserts: HashSet<UploadableAction>,
    pub removes: HashSet<UploadableAction>,
}

/// Net uploadable action changes, grouped by content id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadableActionChanges {
    actions: HashMap<ContentId, ActionSets>,
}

impl UploadableActionChanges {
    pub fn get(&self, content_id: &str) -> Option<&ActionSets> {
        self.actions.get(content_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContentId, &ActionSets)> {
        self.actions.iter()
    }

    pub fn into_actions(self) -> HashMap<ContentId, ActionSets> {
        self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

pub struct UploadableActionMutation<'a> {
    store: &'a FeedStore,
    changes: UploadableActionChanges,
}

impl<'a> UploadableActionMutation<'a> {
    pub(crate) fn new(store: &'a FeedStore) -> Self {
        Self {
            store,
            changes: UploadableActionChanges::default(),
        }
    }

    pub fn upsert(mut self, payload: impl Into<Vec<u8>>, content_id: impl Into<ContentId>) -> Self {
        let action = UploadableAction::new(content_id, payload);
        let sets = self
            .changes
            .actions
            .entry(action.content_id.clone())
            .or_default();
        sets.removes.remove(&action);
        sets.upserts.insert(action);
        self
    }

    pub fn remove(mut self, payload: impl Into<Vec<u8>>, content_id: impl Into<ContentId>) -> Self {
        let action = UploadableAction::new(content_id, payload);
        let sets = self
            .changes
            .actions
            .entry(action.content_id.clone())
            .or_default();
        sets.upserts.remove(&action);
        sets.removes.insert(action);
        self
    }

    pub fn finish(self) -> UploadableActionChanges {
        self.changes
    }

    pub fn commit(self) -> CommitResult {
        self.store.commit_uploadable_actions(self.changes)
    }
}
