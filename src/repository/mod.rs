//! # Blob Repository
//!
//! Atomic, partition-scoped CRUD and derived statistics over
//! [`FileRecord`] entities, isolating callers from the transaction
//! lifecycle of the underlying store.
//!
//! # Design Principles
//!
//! - One transaction per call, no cross-call state, no caching
//! - Absence is a result, not an error
//! - Full-record upsert only: no field-level partial updates
//! - Statistics: record count is authoritative, size is best-effort
//! - Store faults propagate unchanged; no internal retry

pub mod errors;
pub mod stats;

pub use errors::{RepositoryError, RepositoryResult};
pub use stats::StorageStats;

use std::sync::Arc;

use tracing::warn;

use crate::record::{FileMetadata, FileRecord};
use crate::store::{TransactionalStore, TxMode};

/// Default partition holding file records
pub const FILES_PARTITION: &str = "files";

/// How one enumerated record contributes to the size total
enum EffectiveSize {
    /// Actual payload length of a healthy record
    Actual(u64),
    /// Declared metadata size of a record whose payload is unreadable
    Declared { id: String, size: u64 },
    /// Record too damaged to inspect at all
    Unknown,
}

/// Transactional repository for binary file content plus metadata.
///
/// Stateless apart from the shared store handle; safe to clone and share.
#[derive(Clone)]
pub struct BlobRepository {
    store: Arc<dyn TransactionalStore>,
    partition: String,
}

impl BlobRepository {
    /// Create a repository over the default [`FILES_PARTITION`]
    pub fn new(store: Arc<dyn TransactionalStore>) -> Self {
        Self::with_partition(store, FILES_PARTITION)
    }

    /// Create a repository over a named partition
    pub fn with_partition(store: Arc<dyn TransactionalStore>, partition: impl Into<String>) -> Self {
        Self {
            store,
            partition: partition.into(),
        }
    }

    /// Fetch the payload stored under `id`.
    ///
    /// Returns `Ok(None)` when no such record exists.
    pub async fn get_file(&self, id: &str) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self.get_record(id).await?.map(|record| record.payload))
    }

    /// Fetch the full record (payload and metadata) stored under `id`
    pub async fn get_record(&self, id: &str) -> RepositoryResult<Option<FileRecord>> {
        let tx = self.store.begin(&[&self.partition], TxMode::Read).await?;
        let raw = tx.partition(&self.partition)?.get(id).await?;
        tx.commit().await?;

        match raw {
            None => Ok(None),
            Some(bytes) => FileRecord::decode(&bytes).map(Some).map_err(|err| {
                RepositoryError::Corrupt {
                    id: id.to_string(),
                    reason: err.to_string(),
                }
            }),
        }
    }

    /// Whether a record exists under `id`
    pub async fn has_file(&self, id: &str) -> RepositoryResult<bool> {
        let tx = self.store.begin(&[&self.partition], TxMode::Read).await?;
        let raw = tx.partition(&self.partition)?.get(id).await?;
        tx.commit().await?;
        Ok(raw.is_some())
    }

    /// Insert or fully replace the record keyed by `record.id`.
    ///
    /// Atomic: on error nothing is guaranteed durable, and the identical
    /// call may safely be retried.
    pub async fn save_file(&self, record: &FileRecord) -> RepositoryResult<()> {
        let bytes = record
            .encode()
            .map_err(|err| RepositoryError::Encode(err.to_string()))?;

        let tx = self.store.begin(&[&self.partition], TxMode::Write).await?;
        tx.partition(&self.partition)?.put(&record.id, bytes).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove the record under `id`. Removing an absent id is a no-op success.
    pub async fn delete_file(&self, id: &str) -> RepositoryResult<()> {
        let tx = self.store.begin(&[&self.partition], TxMode::Write).await?;
        tx.partition(&self.partition)?.delete(id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Metadata for every readable record in the partition.
    ///
    /// Records whose head cannot be decoded are skipped with a warning.
    pub async fn list_metadata(&self) -> RepositoryResult<Vec<FileMetadata>> {
        let tx = self.store.begin(&[&self.partition], TxMode::Read).await?;
        let values = tx.partition(&self.partition)?.get_all().await?;
        tx.commit().await?;

        let mut out = Vec::with_capacity(values.len());
        for raw in &values {
            match FileRecord::decode_head(raw) {
                Ok(head) => out.push(head.metadata),
                Err(err) => {
                    warn!(error = %err, partition = %self.partition, "skipping undecodable record in listing");
                }
            }
        }
        Ok(out)
    }

    /// Aggregate record count and total size for the partition.
    ///
    /// `count` comes from the store's count primitive and is always exact.
    /// `total_size` is summed per record — actual payload length when the
    /// record decodes, declared metadata size when only its head does, zero
    /// otherwise — and any estimated or skipped record clears
    /// `size_complete`. A failed enumeration degrades to a zero total; it
    /// never fails the call or touches the count.
    pub async fn storage_stats(&self) -> RepositoryResult<StorageStats> {
        let tx = self.store.begin(&[&self.partition], TxMode::Read).await?;
        let part = tx.partition(&self.partition)?;

        let count = part.count().await?;

        let (total_size, size_complete) = match part.get_all().await {
            Ok(values) => {
                let mut total = 0u64;
                let mut complete = true;
                for raw in &values {
                    match Self::effective_size(raw) {
                        EffectiveSize::Actual(size) => total += size,
                        EffectiveSize::Declared { id, size } => {
                            warn!(
                                id = %id,
                                declared = size,
                                "record payload unreadable; using declared size"
                            );
                            total += size;
                            complete = false;
                        }
                        EffectiveSize::Unknown => {
                            warn!(partition = %self.partition, "undecodable record excluded from size total");
                            complete = false;
                        }
                    }
                }
                (total, complete)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    partition = %self.partition,
                    "record enumeration failed; size total degraded to zero"
                );
                (0, false)
            }
        };

        tx.commit().await?;
        Ok(StorageStats {
            count,
            total_size,
            size_complete,
        })
    }

    fn effective_size(raw: &[u8]) -> EffectiveSize {
        match FileRecord::decode(raw) {
            Ok(record) => EffectiveSize::Actual(record.payload.len() as u64),
            Err(_) => match FileRecord::decode_head(raw) {
                Ok(head) => EffectiveSize::Declared {
                    id: head.id,
                    size: head.metadata.size,
                },
                Err(_) => EffectiveSize::Unknown,
            },
        }
    }
}
