//! # Transactional Store Interface
//!
//! The repository does not talk to a concrete database. It consumes a narrow
//! capability interface: a store that exposes named partitions and scoped
//! transactions over them. Any backend satisfying these traits can sit
//! underneath, including the in-memory implementation shipped here.
//!
//! # Design Principles
//!
//! - Composition over inheritance: the store is injected, never subclassed
//! - A transaction is the only way to touch records
//! - Write transactions apply atomically at commit; dropping one aborts it
//! - Record values are opaque bytes; encoding belongs to the caller

pub mod errors;
pub mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Transaction access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    Read,
    Write,
}

/// Record operations available inside a transaction, scoped to one partition.
///
/// All mutations are buffered by the owning transaction and become visible
/// to other transactions only after a successful commit.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a record by id. Absent is `Ok(None)`, never an error.
    async fn get(&self, id: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Insert or replace the record stored under `id`
    async fn put(&self, id: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove the record stored under `id`, if any
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Number of records in the partition
    async fn count(&self) -> StoreResult<u64>;

    /// All record values in the partition, in key order
    async fn get_all(&self) -> StoreResult<Vec<Vec<u8>>>;
}

/// A scoped unit of store operations with atomic commit semantics.
///
/// Dropping a transaction without calling [`commit`](StoreTransaction::commit)
/// aborts it: buffered writes are discarded.
#[async_trait]
pub trait StoreTransaction: Send + std::fmt::Debug {
    /// Access one of the partitions this transaction was opened against
    fn partition(&self, name: &str) -> StoreResult<&dyn RecordStore>;

    /// Commit the transaction, awaiting completion.
    ///
    /// A commit failure means no buffered write is guaranteed durable.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// A store providing named partitions and transactions over them
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    /// Open a transaction scoped to the given partitions
    async fn begin(
        &self,
        partitions: &[&str],
        mode: TxMode,
    ) -> StoreResult<Box<dyn StoreTransaction>>;
}
