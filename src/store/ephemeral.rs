//! Ephemeral store
//!
//! Keeps every namespace in memory. Nothing survives the process, GC is
//! disabled, and no thread check is made.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::error::Result;
use crate::gc::AccessibleSupplier;
use crate::keys::HEAD_SESSION_ID;
use crate::model::{
    ActionType, ContentId, LocalAction, Payload, PayloadWithId, SemanticPropertiesWithId,
    StreamSharedState, StreamStructure, UploadableAction,
};
use crate::mutation::{
    CommitResult, ContentChanges, LocalActionChanges, SemanticPropertiesChanges, SessionChanges,
    UploadableActionChanges,
};
use crate::task::Task;

use super::backend::StoreBackend;

#[derive(Default)]
struct EphemeralState {
    payloads: HashMap<ContentId, Payload>,
    shared_states: HashMap<ContentId, StreamSharedState>,
    semantic_properties: HashMap<ContentId, Vec<u8>>,
    sessions: HashMap<String, Vec<StreamStructure>>,
    local_actions: Vec<LocalAction>,
    uploadable_actions: HashMap<ContentId, HashSet<UploadableAction>>,
}

impl EphemeralState {
    fn with_head() -> Self {
        let mut state = Self::default();
        state.sessions.insert(HEAD_SESSION_ID.to_string(), Vec::new());
        state
    }
}

pub(crate) struct EphemeralStore {
    state: Mutex<EphemeralState>,
    clock: Arc<dyn Clock>,
}

impl EphemeralStore {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(EphemeralState::with_head()),
            clock,
        }
    }
}

fn noop_task() -> Task {
    Box::new(|| {})
}

impl StoreBackend for EphemeralStore {
    fn get_payloads(&self, ids: &[ContentId]) -> Result<Vec<PayloadWithId>> {
        let state = self.state.lock();
        Ok(ids
            .iter()
            .filter_map(|id| {
                state.payloads.get(id).map(|payload| PayloadWithId {
                    content_id: id.clone(),
                    payload: payload.clone(),
                })
            })
            .collect())
    }

    fn get_shared_states(&self) -> Result<Vec<StreamSharedState>> {
        Ok(self.state.lock().shared_states.values().cloned().collect())
    }

    fn get_stream_structures(&self, session_id: &str) -> Result<Vec<StreamStructure>> {
        Ok(self
            .state
            .lock()
            .sessions
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    fn get_all_sessions(&self) -> Result<Vec<String>> {
        let mut sessions: Vec<String> = self
            .state
            .lock()
            .sessions
            .keys()
            .filter(|name| name.as_str() != HEAD_SESSION_ID)
            .cloned()
            .collect();
        sessions.sort();
        Ok(sessions)
    }

    fn session_exists(&self, session_id: &str) -> Result<bool> {
        Ok(self.state.lock().sessions.contains_key(session_id))
    }

    fn get_semantic_properties(&self, ids: &[ContentId]) -> Result<Vec<SemanticPropertiesWithId>> {
        let state = self.state.lock();
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .semantic_properties
                    .get(id)
                    .map(|data| SemanticPropertiesWithId {
                        content_id: id.clone(),
                        data: data.clone(),
                    })
            })
            .collect())
    }

    fn get_all_dismiss_local_actions(&self) -> Result<Vec<LocalAction>> {
        Ok(self
            .state
            .lock()
            .local_actions
            .iter()
            .filter(|action| action.action_type == ActionType::Dismiss)
            .cloned()
            .collect())
    }

    fn get_all_uploadable_actions(&self) -> Result<HashSet<UploadableAction>> {
        Ok(self
            .state
            .lock()
            .uploadable_actions
            .values()
            .flatten()
            .cloned()
            .collect())
    }

    fn create_new_session(&self, session_id: String) -> Result<String> {
        let mut state = self.state.lock();
        let head = state
            .sessions
            .get(HEAD_SESSION_ID)
            .cloned()
            .unwrap_or_default();
        state.sessions.insert(session_id.clone(), head);
        Ok(session_id)
    }

    fn remove_session(&self, session_id: &str) -> CommitResult {
        self.state.lock().sessions.remove(session_id);
        CommitResult::Success
    }

    fn clear_head(&self) -> CommitResult {
        self.state
            .lock()
            .sessions
            .insert(HEAD_SESSION_ID.to_string(), Vec::new());
        CommitResult::Success
    }

    fn commit_content(&self, changes: ContentChanges) -> CommitResult {
        let mut state = self.state.lock();
        for (content_id, payload) in changes.into_entries() {
            match payload {
                Payload::SharedState(shared) => {
                    state.shared_states.insert(shared.content_id.clone(), shared);
                }
                other => {
                    state.payloads.insert(content_id, other);
                }
            }
        }
        CommitResult::Success
    }

    fn commit_session(&self, changes: SessionChanges) -> CommitResult {
        let (session_id, structures) = changes.into_parts();
        self.state
            .lock()
            .sessions
            .entry(session_id)
            .or_default()
            .extend(structures);
        CommitResult::Success
    }

    fn commit_semantic_properties(&self, changes: SemanticPropertiesChanges) -> CommitResult {
        self.state
            .lock()
            .semantic_properties
            .extend(changes.into_entries());
        CommitResult::Success
    }

    fn commit_local_actions(&self, changes: LocalActionChanges) -> CommitResult {
        let timestamp_seconds = self.clock.now_seconds();
        let mut state = self.state.lock();
        for (action_type, content_id) in changes.into_actions() {
            state.local_actions.push(LocalAction {
                action_type,
                content_id,
                timestamp_seconds,
            });
        }
        CommitResult::Success
    }

    fn commit_uploadable_actions(&self, changes: UploadableActionChanges) -> CommitResult {
        let mut state = self.state.lock();
        for (content_id, sets) in changes.into_actions() {
            let actions = state.uploadable_actions.entry(content_id.clone()).or_default();
            for action in &sets.removes {
                actions.remove(action);
            }
            actions.extend(sets.upserts);
            if actions.is_empty() {
                state.uploadable_actions.remove(&content_id);
            }
        }
        CommitResult::Success
    }

    fn content_gc(
        &self,
        _reserved: HashSet<ContentId>,
        _accessible: AccessibleSupplier,
        _keep_shared_states: bool,
    ) -> Task {
        noop_task()
    }

    fn local_action_gc(&self, _actions: Vec<LocalAction>, _valid: HashSet<ContentId>) -> Task {
        noop_task()
    }

    fn clear_all(&self) -> bool {
        *self.state.lock() = EphemeralState::with_head();
        true
    }
}
