//! # Repository Errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures surfaced by [`BlobRepository`](super::BlobRepository).
///
/// A missing record is never an error; reads report absence as `Ok(None)`.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The underlying transaction could not be opened or committed.
    /// Propagated unchanged; the repository never retries.
    #[error("store transaction failed: {0}")]
    Store(#[from] StoreError),

    /// A record could not be serialized for storage
    #[error("record encoding failed: {0}")]
    Encode(String),

    /// A stored record could not be decoded on a strict read path
    #[error("record {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}
