//! Record codec
//!
//! bincode encoding for every record the store persists. Decoders run each
//! content id through the interner.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::intern::Interner;
use crate::model::{LocalAction, Payload, StreamSharedState, StreamStructure, UploadableAction};

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn decode_payload(bytes: &[u8], interner: &Interner) -> Result<Payload> {
    let payload: Payload = decode(bytes)?;
    Ok(payload.intern_with(|id| interner.intern_id(id)))
}

pub fn decode_shared_state(bytes: &[u8], interner: &Interner) -> Result<StreamSharedState> {
    let state: StreamSharedState = decode(bytes)?;
    Ok(StreamSharedState {
        content_id: interner.intern_id(&state.content_id),
        data: state.data,
    })
}

pub fn decode_structure(bytes: &[u8], interner: &Interner) -> Result<StreamStructure> {
    let structure: StreamStructure = decode(bytes)?;
    Ok(structure.intern_with(|id| interner.intern_id(id)))
}

pub fn decode_local_action(bytes: &[u8], interner: &Interner) -> Result<LocalAction> {
    let mut action: LocalAction = decode(bytes)?;
    action.content_id = interner.intern_id(&action.content_id);
    Ok(action)
}

pub fn decode_uploadable_action(bytes: &[u8], interner: &Interner) -> Result<UploadableAction> {
    let mut action: UploadableAction = decode(bytes)?;
    action.content_id = interner.intern_id(&action.content_id);
    Ok(action)
}
