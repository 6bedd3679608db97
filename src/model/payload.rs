//! Stored content payloads

use serde::{Deserialize, Serialize};

use super::ContentId;

/// A stored piece of feed content.
///
/// Exactly one variant is present for every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// A renderable content node
    Feature {
        content_id: ContentId,
        parent_id: Option<ContentId>,
        data: Vec<u8>,
    },

    /// Render-time shared resource, never session specific
    SharedState(StreamSharedState),

    /// Pagination continuation marker
    Token {
        content_id: ContentId,
        parent_id: Option<ContentId>,
        data: Vec<u8>,
    },
}

impl Payload {
    /// The content id embedded in the payload
    pub fn content_id(&self) -> &ContentId {
        match self {
            Payload::Feature { content_id, .. } => content_id,
            Payload::SharedState(state) => &state.content_id,
            Payload::Token { content_id, .. } => content_id,
        }
    }

    pub fn is_shared_state(&self) -> bool {
        matches!(self, Payload::SharedState(_))
    }

    pub(crate) fn intern_with(self, intern: impl Fn(&ContentId) -> ContentId) -> Self {
        match self {
            Payload::Feature {
                content_id,
                parent_id,
                data,
            } => Payload::Feature {
                content_id: intern(&content_id),
                parent_id: parent_id.as_ref().map(&intern),
                data,
            },
            Payload::SharedState(state) => Payload::SharedState(StreamSharedState {
                content_id: intern(&state.content_id),
                data: state.data,
            }),
            Payload::Token {
                content_id,
                parent_id,
                data,
            } => Payload::Token {
                content_id: intern(&content_id),
                parent_id: parent_id.as_ref().map(&intern),
                data,
            },
        }
    }
}

/// Shared render state keyed by its own content id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSharedState {
    pub content_id: ContentId,
    pub data: Vec<u8>,
}

/// A payload together with the id it was requested by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadWithId {
    pub content_id: ContentId,
    pub payload: Payload,
}

/// Semantic properties blob for one content id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticPropertiesWithId {
    pub content_id: ContentId,
    pub data: Vec<u8>,
}
