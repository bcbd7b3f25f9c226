//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Faults raised by a transactional store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Partition not found: {0}")]
    PartitionNotFound(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Write attempted in a read transaction")]
    ReadOnlyTransaction,

    #[error("Backend error: {0}")]
    Backend(String),
}
