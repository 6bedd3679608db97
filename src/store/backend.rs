//! Operations both store implementations provide

use std::collections::HashSet;

use crate::error::Result;
use crate::gc::AccessibleSupplier;
use crate::model::{
    ContentId, LocalAction, PayloadWithId, SemanticPropertiesWithId, StreamSharedState,
    StreamStructure, UploadableAction,
};
use crate::mutation::{
    CommitResult, ContentChanges, LocalActionChanges, SemanticPropertiesChanges, SessionChanges,
    UploadableActionChanges,
};
use crate::task::Task;

pub(crate) trait StoreBackend: Send + Sync {
    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------
    fn get_payloads(&self, ids: &[ContentId]) -> Result<Vec<PayloadWithId>>;

    fn get_shared_states(&self) -> Result<Vec<StreamSharedState>>;

    fn get_stream_structures(&self, session_id: &str) -> Result<Vec<StreamStructure>>;

    fn get_all_sessions(&self) -> Result<Vec<String>>;

    fn session_exists(&self, session_id: &str) -> Result<bool>;

    fn get_semantic_properties(&self, ids: &[ContentId]) -> Result<Vec<SemanticPropertiesWithId>>;

    fn get_all_dismiss_local_actions(&self) -> Result<Vec<LocalAction>>;

    fn get_all_uploadable_actions(&self) -> Result<HashSet<UploadableAction>>;

    // -------------------------------------------------------------------------
    // Sessions
    // -------------------------------------------------------------------------
    fn create_new_session(&self, session_id: String) -> Result<String>;

    fn remove_session(&self, session_id: &str) -> CommitResult;

    fn clear_head(&self) -> CommitResult;

    // -------------------------------------------------------------------------
    // Commits
    // -------------------------------------------------------------------------
    fn commit_content(&self, changes: ContentChanges) -> CommitResult;

    fn commit_session(&self, changes: SessionChanges) -> CommitResult;

    fn commit_semantic_properties(&self, changes: SemanticPropertiesChanges) -> CommitResult;

    fn commit_local_actions(&self, changes: LocalActionChanges) -> CommitResult;

    fn commit_uploadable_actions(&self, changes: UploadableActionChanges) -> CommitResult;

    // -------------------------------------------------------------------------
    // Garbage collection and reset
    // -------------------------------------------------------------------------
    fn content_gc(
        &self,
        reserved: HashSet<ContentId>,
        accessible: AccessibleSupplier,
        keep_shared_states: bool,
    ) -> Task;

    fn local_action_gc(&self, actions: Vec<LocalAction>, valid: HashSet<ContentId>) -> Task;

    fn clear_all(&self) -> bool;
}
