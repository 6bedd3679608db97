//! Local and uploadable actions

use serde::{Deserialize, Serialize};

use super::ContentId;
use crate::keys;

/// Family of locally recorded user actions.
///
/// Each family is persisted in its own journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Dismiss,
}

impl ActionType {
    /// Name of the journal holding actions of this family
    pub fn journal_name(self) -> &'static str {
        match self {
            ActionType::Dismiss => keys::DISMISS_ACTION_JOURNAL,
        }
    }
}

/// A user action recorded on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAction {
    pub action_type: ActionType,
    pub content_id: ContentId,
    /// Seconds since the unix epoch at commit time
    pub timestamp_seconds: u64,
}

/// An action waiting to be uploaded to the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadableAction {
    pub content_id: ContentId,
    pub payload: Vec<u8>,
}

impl UploadableAction {
    pub fn new(content_id: impl Into<ContentId>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            content_id: content_id.into(),
            payload: payload.into(),
        }
    }

    /// Storage key: prefix + content id + payload hash
    pub fn storage_key(&self) -> String {
        keys::uploadable_action_key(&self.content_id, &self.payload)
    }
}
