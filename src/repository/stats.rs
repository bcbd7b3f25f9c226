//! # Aggregate Storage Statistics

use serde::{Deserialize, Serialize};

/// Aggregate usage figures for one partition.
///
/// The two fields carry different guarantees: `count` is authoritative and
/// computed independently of record contents, while `total_size` is
/// best-effort telemetry. `size_complete` tells the two apart — when false,
/// at least one record's size had to be estimated or skipped and
/// `total_size` is a lower bound, not an exact figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Exact number of records in the partition
    pub count: u64,
    /// Sum of effective record sizes in bytes
    pub total_size: u64,
    /// True when every record contributed its actual payload length
    pub size_complete: bool,
}

impl StorageStats {
    /// Stats for an empty partition
    pub fn empty() -> Self {
        Self {
            count: 0,
            total_size: 0,
            size_complete: true,
        }
    }
}
