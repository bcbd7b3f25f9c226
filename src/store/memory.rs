//! # In-Memory Transactional Store
//!
//! Partitioned in-memory backend with snapshot isolation:
//!
//! - `begin` clones the requested partitions, so a read transaction observes
//!   a stable snapshot for its whole lifetime
//! - a write transaction edits its snapshot (read-your-writes) while logging
//!   every mutation; commit replays the log onto the shared state under one
//!   lock, so concurrent readers see the full pre-write or full post-write
//!   state and nothing in between
//! - last-committed-wins when write transactions race on the same id

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use super::errors::{StoreError, StoreResult};
use super::{RecordStore, StoreTransaction, TransactionalStore, TxMode};

type Partition = BTreeMap<String, Vec<u8>>;
type Shared = Arc<RwLock<HashMap<String, Partition>>>;

/// In-memory [`TransactionalStore`] with fixed, named partitions
#[derive(Debug, Clone)]
pub struct MemoryStore {
    partitions: Shared,
}

impl MemoryStore {
    /// Create a store with the given partitions, all empty
    pub fn new(partition_names: &[&str]) -> Self {
        let partitions = partition_names
            .iter()
            .map(|name| (name.to_string(), Partition::new()))
            .collect();
        Self {
            partitions: Arc::new(RwLock::new(partitions)),
        }
    }

    /// Write raw record bytes directly, bypassing the transaction layer.
    ///
    /// Intended for seeding fixtures and simulating partially-written or
    /// corrupted records.
    pub fn insert_raw(&self, partition: &str, id: &str, value: Vec<u8>) -> StoreResult<()> {
        let mut shared = self
            .partitions
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))?;
        shared
            .get_mut(partition)
            .ok_or_else(|| StoreError::PartitionNotFound(partition.to_string()))?
            .insert(id.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn begin(
        &self,
        partitions: &[&str],
        mode: TxMode,
    ) -> StoreResult<Box<dyn StoreTransaction>> {
        let shared = self
            .partitions
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))?;

        let mut parts = HashMap::new();
        for name in partitions {
            let snapshot = shared
                .get(*name)
                .ok_or_else(|| StoreError::PartitionNotFound(name.to_string()))?
                .clone();
            parts.insert(name.to_string(), TxPartition::new(snapshot, mode));
        }
        drop(shared);

        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.partitions),
            parts,
            mode,
        }))
    }
}

/// One buffered mutation inside a write transaction
#[derive(Debug)]
enum Op {
    Put { id: String, value: Vec<u8> },
    Delete { id: String },
}

/// Per-partition transaction state: a snapshot plus the mutation log
#[derive(Debug)]
struct TxPartition {
    mode: TxMode,
    local: Mutex<Partition>,
    ops: Mutex<Vec<Op>>,
}

impl TxPartition {
    fn new(snapshot: Partition, mode: TxMode) -> Self {
        Self {
            mode,
            local: Mutex::new(snapshot),
            ops: Mutex::new(Vec::new()),
        }
    }

    fn local(&self) -> StoreResult<std::sync::MutexGuard<'_, Partition>> {
        self.local
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))
    }

    fn record(&self, op: Op) -> StoreResult<()> {
        self.ops
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))?
            .push(op);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for TxPartition {
    async fn get(&self, id: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.local()?.get(id).cloned())
    }

    async fn put(&self, id: &str, value: Vec<u8>) -> StoreResult<()> {
        if self.mode != TxMode::Write {
            return Err(StoreError::ReadOnlyTransaction);
        }
        self.local()?.insert(id.to_string(), value.clone());
        self.record(Op::Put {
            id: id.to_string(),
            value,
        })
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        if self.mode != TxMode::Write {
            return Err(StoreError::ReadOnlyTransaction);
        }
        self.local()?.remove(id);
        self.record(Op::Delete { id: id.to_string() })
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.local()?.len() as u64)
    }

    async fn get_all(&self) -> StoreResult<Vec<Vec<u8>>> {
        Ok(self.local()?.values().cloned().collect())
    }
}

#[derive(Debug)]
struct MemoryTransaction {
    shared: Shared,
    parts: HashMap<String, TxPartition>,
    mode: TxMode,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    fn partition(&self, name: &str) -> StoreResult<&dyn RecordStore> {
        self.parts
            .get(name)
            .map(|p| p as &dyn RecordStore)
            .ok_or_else(|| StoreError::PartitionNotFound(name.to_string()))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        if self.mode == TxMode::Read {
            return Ok(());
        }

        let mut shared = self
            .shared
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".into()))?;

        for (name, part) in &self.parts {
            let target = shared
                .get_mut(name)
                .ok_or_else(|| StoreError::TransactionFailed(format!("partition {name} vanished")))?;
            let ops = part
                .ops
                .lock()
                .map_err(|_| StoreError::Backend("lock poisoned".into()))?;
            for op in ops.iter() {
                match op {
                    Op::Put { id, value } => {
                        target.insert(id.clone(), value.clone());
                    }
                    Op::Delete { id } => {
                        target.remove(id);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = "files";

    fn store() -> MemoryStore {
        MemoryStore::new(&[PART])
    }

    #[tokio::test]
    async fn test_put_get_across_transactions() {
        let store = store();

        let tx = store.begin(&[PART], TxMode::Write).await.unwrap();
        tx.partition(PART)
            .unwrap()
            .put("a", b"one".to_vec())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let tx = store.begin(&[PART], TxMode::Read).await.unwrap();
        let value = tx.partition(PART).unwrap().get("a").await.unwrap();
        assert_eq!(value, Some(b"one".to_vec()));
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_transaction_rejects_writes() {
        let store = store();
        let tx = store.begin(&[PART], TxMode::Read).await.unwrap();
        let err = tx
            .partition(PART)
            .unwrap()
            .put("a", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnlyTransaction));
    }

    #[tokio::test]
    async fn test_unknown_partition_rejected_at_begin() {
        let store = store();
        let err = store.begin(&["nope"], TxMode::Read).await.unwrap_err();
        assert!(matches!(err, StoreError::PartitionNotFound(_)));
    }

    #[tokio::test]
    async fn test_snapshot_isolation() {
        let store = store();

        let write = store.begin(&[PART], TxMode::Write).await.unwrap();
        write
            .partition(PART)
            .unwrap()
            .put("a", b"new".to_vec())
            .await
            .unwrap();

        // Opened before the commit: must keep seeing the empty state
        let read = store.begin(&[PART], TxMode::Read).await.unwrap();
        write.commit().await.unwrap();
        assert_eq!(read.partition(PART).unwrap().count().await.unwrap(), 0);

        // Opened after the commit: sees the full write
        let read = store.begin(&[PART], TxMode::Read).await.unwrap();
        assert_eq!(read.partition(PART).unwrap().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_transaction_aborts() {
        let store = store();

        {
            let tx = store.begin(&[PART], TxMode::Write).await.unwrap();
            tx.partition(PART)
                .unwrap()
                .put("a", vec![1])
                .await
                .unwrap();
            // dropped without commit
        }

        let tx = store.begin(&[PART], TxMode::Read).await.unwrap();
        assert_eq!(tx.partition(PART).unwrap().get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_transaction_reads_its_own_writes() {
        let store = store();
        let tx = store.begin(&[PART], TxMode::Write).await.unwrap();
        let part = tx.partition(PART).unwrap();
        part.put("a", b"x".to_vec()).await.unwrap();
        assert_eq!(part.get("a").await.unwrap(), Some(b"x".to_vec()));
        part.delete("a").await.unwrap();
        assert_eq!(part.get("a").await.unwrap(), None);
        tx.commit().await.unwrap();
    }
}
