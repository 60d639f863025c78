//! Error types for the affinity-group core.

use thiserror::Error;

use crate::membership::types::HostId;

#[derive(Debug, Error)]
pub enum KelipsError {
    #[error("node '{0}' is already a member")]
    AlreadyMember(HostId),

    #[error("node '{0}' not found")]
    NodeNotFound(HostId),

    #[error("key '{0}' has no tuples")]
    KeyNotFound(String),

    #[error("cannot split a {hash_len}-byte keyspace into {groups} affinity groups")]
    InvalidGroupCount { groups: usize, hash_len: usize },

    #[error("snapshot codec failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl KelipsError {
    /// `true` for the "nothing there" family of errors, which callers
    /// usually treat as a no-op rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::KeyNotFound(_))
    }

    pub(crate) fn key_not_found(key: &[u8]) -> Self {
        Self::KeyNotFound(String::from_utf8_lossy(key).into_owned())
    }
}

pub type Result<T> = std::result::Result<T, KelipsError>;
