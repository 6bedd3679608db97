//! Key namespaces and reserved names
//!
//! These strings are part of the on-disk format and must not change.

/// Prefix of semantic properties keys in content storage
pub const SEMANTIC_PROPERTIES_PREFIX: &str = "sp::";

/// Prefix of shared state keys in content storage
pub const SHARED_STATE_PREFIX: &str = "ss::";

/// Prefix of uploadable action keys in content storage
pub const UPLOADABLE_ACTION_PREFIX: &str = "ua::";

/// Journal holding the canonical session
pub const HEAD_SESSION_ID: &str = "$HEAD";

/// Journal holding dismiss actions
pub const DISMISS_ACTION_JOURNAL: &str = "action_dismiss";

/// Prefix of session ids minted by `create_new_session`
pub const SESSION_NAME_PREFIX: &str = "_session:";

pub fn semantic_properties_key(content_id: &str) -> String {
    format!("{SEMANTIC_PROPERTIES_PREFIX}{content_id}")
}

pub fn shared_state_key(content_id: &str) -> String {
    format!("{SHARED_STATE_PREFIX}{content_id}")
}

/// Key of one uploadable action; the CRC32 suffix keeps several actions
/// on the same content id apart.
pub fn uploadable_action_key(content_id: &str, payload: &[u8]) -> String {
    format!(
        "{UPLOADABLE_ACTION_PREFIX}{content_id}{:08x}",
        crc32fast::hash(payload)
    )
}

/// True for journals that hold actions rather than sessions
pub fn is_action_journal(name: &str) -> bool {
    name == DISMISS_ACTION_JOURNAL
}
