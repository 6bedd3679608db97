//! Session structure mutations

use crate::model::StreamStructure;
use crate::mutation::CommitResult;
use crate::store::FeedStore;

/// Structures to append to one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChanges {
    session_id: String,
    structures: Vec<StreamStructure>,
}

impl SessionChanges {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn structures(&self) -> &[StreamStructure] {
        &self.structures
    }

    pub fn into_parts(self) -> (String, Vec<StreamStructure>) {
        (self.session_id, self.structures)
    }
}

/// Builder appending structures to a session.
///
/// Committing with nothing added still creates the session.
pub struct SessionMutation<'a> {
    store: &'a FeedStore,
    changes: SessionChanges,
}

impl<'a> SessionMutation<'a> {
    pub(crate) fn new(store: &'a FeedStore, session_id: impl Into<String>) -> Self {
        Self {
            store,
            changes: SessionChanges {
                session_id: session_id.into(),
                structures: Vec::new(),
            },
        }
    }

    pub fn add(mut self, structure: StreamStructure) -> Self {
        self.changes.structures.push(structure);
        self
    }

    pub fn finish(self) -> SessionChanges {
        self.changes
    }

    pub fn commit(self) -> CommitResult {
        self.store.commit_session(self.changes)
    }
}
