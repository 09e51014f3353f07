//! Store error taxonomy.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The grid instance has been shut down.
    #[error("data grid instance is not active")]
    NotActive,

    #[error("timed out after {waited:?} acquiring lock on key '{key}'")]
    LockTimeout { key: String, waited: Duration },

    /// Unlock attempted by a caller that does not hold the lock.
    #[error("lock on key '{key}' is held by another owner")]
    LockNotOwned { key: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("sequence '{name}' is full")]
    SequenceFull { name: String },

    #[error("listener limit of {limit} reached")]
    ListenerLimit { limit: usize },
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StoreError::InvalidArgument(msg.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
