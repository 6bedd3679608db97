//! Local action mutations

use crate::model::{ActionType, ContentId};
use crate::mutation::CommitResult;
use crate::store::FeedStore;

/// Actions to record. Timestamps are assigned by the store at commit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalActionChanges {
    actions: Vec<(ActionType, ContentId)>,
}

impl LocalActionChanges {
    pub fn actions(&self) -> &[(ActionType, ContentId)] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<(ActionType, ContentId)> {
        self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

pub struct LocalActionMutation<'a> {
    store: &'a FeedStore,
    changes: LocalActionChanges,
}

impl<'a> LocalActionMutation<'a> {
    pub(crate) fn new(store: &'a FeedStore) -> Self {
        Self {
            store,
            changes: LocalActionChanges::default(),
        }
    }

    pub fn add(mut self, action_type: ActionType, content_id: impl Into<ContentId>) -> Self {
        self.changes.actions.push((action_type, content_id.into()));
        self
    }

    pub fn finish(self) -> LocalActionChanges {
        self.changes
    }

    pub fn commit(self) -> CommitResult {
        self.store.commit_local_actions(self.changes)
    }
}
