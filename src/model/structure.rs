//! Session structure records

use serde::{Deserialize, Serialize};

use super::ContentId;

/// Kind of change a structure record applies to a session tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureOperation {
    ClearAll,
    UpdateOrAppend,
    Remove,
    RequiredContent,
}

/// One operation in a session's ordered structure list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStructure {
    pub operation: StructureOperation,
    pub content_id: ContentId,
    pub parent_content_id: Option<ContentId>,
}

impl StreamStructure {
    pub fn new(
        operation: StructureOperation,
        content_id: impl Into<ContentId>,
        parent_content_id: Option<ContentId>,
    ) -> Self {
        Self {
            operation,
            content_id: content_id.into(),
            parent_content_id,
        }
    }

    /// Shorthand for an `UpdateOrAppend` record
    pub fn update_or_append(content_id: impl Into<ContentId>, parent: Option<ContentId>) -> Self {
        Self::new(StructureOperation::UpdateOrAppend, content_id, parent)
    }

    /// Shorthand for a `Remove` record
    pub fn remove(content_id: impl Into<ContentId>, parent: Option<ContentId>) -> Self {
        Self::new(StructureOperation::Remove, content_id, parent)
    }

    pub(crate) fn intern_with(self, intern: impl Fn(&ContentId) -> ContentId) -> Self {
        Self {
            operation: self.operation,
            content_id: intern(&self.content_id),
            parent_content_id: self.parent_content_id.as_ref().map(&intern),
        }
    }
}
