//! Model Module
//!
//! Logical records held by the store. Serialization is `serde` based; the
//! byte encoding lives in [`crate::codec`].

mod action;
mod content_id;
mod payload;
mod structure;

pub use action::{ActionType, LocalAction, UploadableAction};
pub use content_id::ContentId;
pub use payload::{Payload, PayloadWithId, SemanticPropertiesWithId, StreamSharedState};
pub use structure::{StreamStructure, StructureOperation};
