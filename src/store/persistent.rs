//! Persistent store
//!
//! Maps the feed data model onto the two storage primitives:
//!
//! ```text
//!   content storage                     journal storage
//!   ─────────────────────────────       ─────────────────────────
//!   <id>            -> Payload          $HEAD           -> [StreamStructure]
//!   ss::<id>        -> SharedState      _session:<uuid> -> [StreamStructure]
//!   sp::<id>        -> bytes            action_dismiss  -> [LocalAction]
//!   ua::<id><crc32> -> UploadableAction
//! ```
//!
//! Every operation blocks on storage I/O and asserts it is off the main
//! thread.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::codec;
use crate::error::Result;
use crate::gc::{AccessibleSupplier, ContentGc, GcContext, LocalActionGc};
use crate::intern::Interner;
use crate::journal::{JournalMutation, JournalStorage};
use crate::keys::{
    is_action_journal, semantic_properties_key, shared_state_key, DISMISS_ACTION_JOURNAL,
    HEAD_SESSION_ID, SHARED_STATE_PREFIX, UPLOADABLE_ACTION_PREFIX,
};
use crate::model::{
    ContentId, LocalAction, Payload, PayloadWithId, SemanticPropertiesWithId, StreamSharedState,
    StreamStructure, UploadableAction,
};
use crate::mutation::{
    CommitResult, ContentChanges, LocalActionChanges, SemanticPropertiesChanges, SessionChanges,
    UploadableActionChanges,
};
use crate::storage::{ContentOperation, ContentStorage, ContentStorageMutation};
use crate::task::{Task, TaskQueue};
use crate::thread::ThreadChecker;

use super::backend::StoreBackend;

pub(crate) struct PersistentStore {
    content: Arc<dyn ContentStorage>,
    journal: Arc<dyn JournalStorage>,
    interner: Arc<Interner>,
    clock: Arc<dyn Clock>,
    task_queue: Arc<dyn TaskQueue>,
    threads: ThreadChecker,
    max_gc_attempts: u32,
}

impl PersistentStore {
    pub(crate) fn new(
        content: Arc<dyn ContentStorage>,
        journal: Arc<dyn JournalStorage>,
        interner: Arc<Interner>,
        clock: Arc<dyn Clock>,
        task_queue: Arc<dyn TaskQueue>,
        threads: ThreadChecker,
        max_gc_attempts: u32,
    ) -> Self {
        Self {
            content,
            journal,
            interner,
            clock,
            task_queue,
            threads,
            max_gc_attempts,
        }
    }

    /// Create an empty HEAD if it is missing
    pub(crate) fn ensure_head(&self) -> Result<()> {
        self.threads.check_not_main_thread();
        if !self.journal.exists(HEAD_SESSION_ID)? {
            debug!("creating empty HEAD session");
            self.journal
                .commit(JournalMutation::new(HEAD_SESSION_ID).append(Vec::new()))?;
        }
        Ok(())
    }

    fn gc_context(&self) -> GcContext {
        GcContext {
            content: Arc::clone(&self.content),
            journal: Arc::clone(&self.journal),
            interner: Arc::clone(&self.interner),
            task_queue: Arc::clone(&self.task_queue),
            max_attempts: self.max_gc_attempts,
        }
    }

    fn build_content_mutation(&self, changes: ContentChanges) -> Result<ContentStorageMutation> {
        let mut mutation = ContentStorageMutation::new();
        for (content_id, payload) in changes.into_entries() {
            let operation = match payload {
                Payload::SharedState(state) => ContentOperation::Upsert {
                    key: shared_state_key(&state.content_id),
                    value: codec::encode(&state)?,
                },
                other => ContentOperation::Upsert {
                    key: content_id.to_string(),
                    value: codec::encode(&other)?,
                },
            };
            mutation.push(operation);
        }
        Ok(mutation)
    }

    fn build_session_mutation(&self, changes: SessionChanges) -> Result<JournalMutation> {
        let (session_id, structures) = changes.into_parts();
        let mut mutation = JournalMutation::new(session_id);
        if structures.is_empty() {
            // Zero-length sentinel: the session exists even when empty
            mutation = mutation.append(Vec::new());
        }
        for structure in &structures {
            mutation = mutation.append(codec::encode(structure)?);
        }
        Ok(mutation)
    }

    fn build_local_action_mutations(&self, changes: LocalActionChanges) -> Result<Vec<JournalMutation>> {
        // One timestamp for the whole commit
        let timestamp_seconds = self.clock.now_seconds();

        let mut by_journal: BTreeMap<&'static str, JournalMutation> = BTreeMap::new();
        for (action_type, content_id) in changes.into_actions() {
            let action = LocalAction {
                action_type,
                content_id,
                timestamp_seconds,
            };
            let journal = action_type.journal_name();
            let mutation = by_journal
                .remove(journal)
                .unwrap_or_else(|| JournalMutation::new(journal))
                .append(codec::encode(&action)?);
            by_journal.insert(journal, mutation);
        }
        Ok(by_journal.into_values().collect())
    }

    fn build_uploadable_mutation(&self, changes: UploadableActionChanges) -> Result<ContentStorageMutation> {
        let mut mutation = ContentStorageMutation::new();
        for (_, sets) in changes.into_actions() {
            for action in &sets.upserts {
                mutation.push(ContentOperation::Upsert {
                    key: action.storage_key(),
                    value: codec::encode(action)?,
                });
            }
            for action in &sets.removes {
                mutation.push(ContentOperation::Delete {
                    key: action.storage_key(),
                });
            }
        }
        Ok(mutation)
    }
}

impl StoreBackend for PersistentStore {
    fn get_payloads(&self, ids: &[ContentId]) -> Result<Vec<PayloadWithId>> {
        self.threads.check_not_main_thread();

        let keys: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let values = self.content.get(&keys)?;

        let mut payloads = Vec::with_capacity(values.len());
        for id in ids {
            let Some(bytes) = values.get(id.as_str()) else {
                continue;
            };
            match codec::decode_payload(bytes, &self.interner) {
                Ok(payload) => payloads.push(PayloadWithId {
                    content_id: self.interner.intern_id(id),
                    payload,
                }),
                Err(e) => error!(content_id = %id, error = %e, "skipping undecodable payload"),
            }
        }
        Ok(payloads)
    }

    fn get_shared_states(&self) -> Result<Vec<StreamSharedState>> {
        self.threads.check_not_main_thread();

        let values = self.content.get_all(SHARED_STATE_PREFIX)?;
        let mut states = Vec::with_capacity(values.len());
        for (key, bytes) in values {
            // Any corrupt shared state fails the whole read
            let state = codec::decode_shared_state(&bytes, &self.interner).map_err(|e| {
                error!(key = %key, error = %e, "undecodable shared state");
                e
            })?;
            states.push(state);
        }
        Ok(states)
    }

    fn get_stream_structures(&self, session_id: &str) -> Result<Vec<StreamStructure>> {
        self.threads.check_not_main_thread();

        let records = self.journal.read(session_id)?;
        let mut structures = Vec::with_capacity(records.len());
        for record in records {
            if record.is_empty() {
                continue;
            }
            match codec::decode_structure(&record, &self.interner) {
                Ok(structure) => structures.push(structure),
                Err(e) => error!(session = session_id, error = %e, "skipping undecodable stream structure"),
            }
        }
        Ok(structures)
    }

    fn get_all_sessions(&self) -> Result<Vec<String>> {
        self.threads.check_not_main_thread();

        Ok(self
            .journal
            .get_all_journals()?
            .into_iter()
            .filter(|name| name != HEAD_SESSION_ID && !is_action_journal(name))
            .collect())
    }

    fn session_exists(&self, session_id: &str) -> Result<bool> {
        self.threads.check_not_main_thread();
        self.journal.exists(session_id)
    }

    fn get_semantic_properties(&self, ids: &[ContentId]) -> Result<Vec<SemanticPropertiesWithId>> {
        self.threads.check_not_main_thread();

        let keys: Vec<String> = ids.iter().map(|id| semantic_properties_key(id)).collect();
        let values = self.content.get(&keys)?;

        Ok(ids
            .iter()
            .zip(keys.iter())
            .filter_map(|(id, key)| {
                values.get(key).map(|data| SemanticPropertiesWithId {
                    content_id: self.interner.intern_id(id),
                    data: data.clone(),
                })
            })
            .collect())
    }

    fn get_all_dismiss_local_actions(&self) -> Result<Vec<LocalAction>> {
        self.threads.check_not_main_thread();

        let records = self.journal.read(DISMISS_ACTION_JOURNAL)?;
        let mut actions = Vec::with_capacity(records.len());
        for record in records {
            match codec::decode_local_action(&record, &self.interner) {
                Ok(action) => actions.push(action),
                Err(e) => error!(error = %e, "skipping undecodable dismiss action"),
            }
        }
        Ok(actions)
    }

    fn get_all_uploadable_actions(&self) -> Result<HashSet<UploadableAction>> {
        self.threads.check_not_main_thread();

        let values = self.content.get_all(UPLOADABLE_ACTION_PREFIX)?;
        let mut actions = HashSet::with_capacity(values.len());
        for (key, bytes) in values {
            match codec::decode_uploadable_action(&bytes, &self.interner) {
                Ok(action) => {
                    actions.insert(action);
                }
                Err(e) => error!(key = %key, error = %e, "skipping undecodable uploadable action"),
            }
        }
        Ok(actions)
    }

    fn create_new_session(&self, session_id: String) -> Result<String> {
        self.threads.check_not_main_thread();

        // The copy runs inside one journal commit, so it never sees a
        // partially applied HEAD mutation.
        self.journal
            .commit(JournalMutation::new(HEAD_SESSION_ID).copy(session_id.as_str()))?;
        debug!(session = %session_id, "forked HEAD");
        Ok(session_id)
    }

    fn remove_session(&self, session_id: &str) -> CommitResult {
        self.threads.check_not_main_thread();
        CommitResult::from_result(
            self.journal.commit(JournalMutation::new(session_id).delete()),
            "remove_session",
        )
    }

    fn clear_head(&self) -> CommitResult {
        self.threads.check_not_main_thread();
        CommitResult::from_result(
            self.journal.commit(
                JournalMutation::new(HEAD_SESSION_ID)
                    .delete()
                    .append(Vec::new()),
            ),
            "clear_head",
        )
    }

    fn commit_content(&self, changes: ContentChanges) -> CommitResult {
        self.threads.check_not_main_thread();
        let result = self
            .build_content_mutation(changes)
            .and_then(|mutation| self.content.commit(mutation));
        CommitResult::from_result(result, "content")
    }

    fn commit_session(&self, changes: SessionChanges) -> CommitResult {
        self.threads.check_not_main_thread();

        let result = self
            .build_session_mutation(changes)
            .and_then(|mutation| self.journal.commit(mutation));
        CommitResult::from_result(result, "session")
    }

    fn commit_semantic_properties(&self, changes: SemanticPropertiesChanges) -> CommitResult {
        self.threads.check_not_main_thread();

        let mut mutation = ContentStorageMutation::new();
        for (content_id, data) in changes.into_entries() {
            mutation.push(ContentOperation::Upsert {
                key: semantic_properties_key(&content_id),
                value: data,
            });
        }
        CommitResult::from_result(self.content.commit(mutation), "semantic_properties")
    }

    fn commit_local_actions(&self, changes: LocalActionChanges) -> CommitResult {
        self.threads.check_not_main_thread();

        let result = self
            .build_local_action_mutations(changes)
            .and_then(|mutations| {
                mutations
                    .into_iter()
                    .try_for_each(|mutation| self.journal.commit(mutation))
            });
        CommitResult::from_result(result, "local_actions")
    }

    fn commit_uploadable_actions(&self, changes: UploadableActionChanges) -> CommitResult {
        self.threads.check_not_main_thread();
        let result = self
            .build_uploadable_mutation(changes)
            .and_then(|mutation| self.content.commit(mutation));
        CommitResult::from_result(result, "uploadable_actions")
    }

    fn content_gc(
        &self,
        reserved: HashSet<ContentId>,
        accessible: AccessibleSupplier,
        keep_shared_states: bool,
    ) -> Task {
        let gc = Arc::new(ContentGc::new(
            self.gc_context(),
            reserved,
            accessible,
            keep_shared_states,
        ));
        let threads = self.threads;
        Box::new(move || {
            threads.check_not_main_thread();
            gc.run();
        })
    }

    fn local_action_gc(&self, actions: Vec<LocalAction>, valid: HashSet<ContentId>) -> Task {
        let gc = LocalActionGc::new(
            Arc::clone(&self.journal),
            DISMISS_ACTION_JOURNAL,
            actions,
            valid,
        );
        let threads = self.threads;
        Box::new(move || {
            threads.check_not_main_thread();
            if let Err(e) = gc.run() {
                error!(error = %e, "local action GC failed");
            }
        })
    }

    fn clear_all(&self) -> bool {
        self.threads.check_not_main_thread();

        if let Err(e) = self
            .content
            .commit(ContentStorageMutation::new().delete_all())
        {
            error!(error = %e, "failed to clear content storage");
            return false;
        }
        if let Err(e) = self.journal.delete_all() {
            error!(error = %e, "failed to clear journal storage");
            return false;
        }
        if let Err(e) = self.ensure_head() {
            warn!(error = %e, "failed to recreate HEAD after clear");
            return false;
        }
        true
    }
}
