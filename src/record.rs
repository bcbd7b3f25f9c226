//! # File Record Types
//!
//! The stored record format is a single bincode value in field order:
//!
//! ```text
//! +------------------+
//! | Record ID        | (string)
//! +------------------+
//! | Checksum         | (SHA-256 hex string, covers payload)
//! +------------------+
//! | Metadata         | (name, size, content type, path, timestamps)
//! +------------------+
//! | Payload          | (length-prefixed bytes)
//! +------------------+
//! ```
//!
//! The payload is deliberately last: a record whose payload bytes are
//! truncated or corrupted can still yield its head (id, checksum, metadata)
//! through a prefix decode that tolerates trailing bytes. Statistics and
//! listing rely on this to stay useful over damaged partitions.

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Descriptive metadata attached to a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Display name
    pub name: String,
    /// Declared byte length. Advisory: callers may write it inconsistently
    /// with the actual payload length, and statistics only fall back to it
    /// when the payload itself is unreadable.
    pub size: u64,
    /// Content/MIME type
    pub content_type: String,
    /// Logical location string
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileMetadata {
    /// Create metadata with both timestamps set to now
    pub fn new(
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
            path: path.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One stored file: payload plus metadata, keyed by a caller-supplied id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Opaque unique identifier, immutable once assigned
    pub id: String,
    /// SHA-256 hex digest of the payload, computed at construction
    pub checksum: String,
    pub metadata: FileMetadata,
    /// Binary content, owned exclusively by the record
    pub payload: Vec<u8>,
}

/// Prefix view of a stored record: everything except the payload.
///
/// Decodable even when the payload bytes behind it are damaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHead {
    pub id: String,
    pub checksum: String,
    pub metadata: FileMetadata,
}

/// Strict codec: a value must consume its buffer exactly.
fn codec() -> impl Options {
    bincode::options()
}

/// Head codec: decodes a [`RecordHead`] prefix, ignoring whatever follows.
fn head_codec() -> impl Options {
    bincode::options().allow_trailing_bytes()
}

impl FileRecord {
    /// Create a record, computing the payload checksum
    pub fn new(id: impl Into<String>, payload: Vec<u8>, metadata: FileMetadata) -> Self {
        Self {
            id: id.into(),
            checksum: Self::calculate_checksum(&payload),
            metadata,
            payload,
        }
    }

    /// Calculate the SHA-256 hex digest for a payload
    pub fn calculate_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Check the stored checksum against the payload actually carried
    pub fn verify_checksum(&self) -> bool {
        Self::calculate_checksum(&self.payload) == self.checksum
    }

    /// Serialize to the stored form
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        codec().serialize(self)
    }

    /// Deserialize a full record from the stored form
    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        codec().deserialize(bytes)
    }

    /// Deserialize only the record head, tolerating a damaged payload tail
    pub fn decode_head(bytes: &[u8]) -> Result<RecordHead, bincode::Error> {
        head_codec().deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> FileRecord {
        FileRecord::new(
            "doc-1",
            b"hello world".to_vec(),
            FileMetadata::new("hello.txt", 11, "text/plain", "/docs/hello.txt"),
        )
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let record = sample_record();
        let bytes = record.encode().unwrap();
        let decoded = FileRecord::decode(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_checksum() {
        let record = sample_record();
        assert_eq!(record.checksum.len(), 64); // SHA-256 hex
        assert!(record.verify_checksum());

        let mut tampered = record;
        tampered.payload.push(0);
        assert!(!tampered.verify_checksum());
    }

    #[test]
    fn test_head_survives_truncated_payload() {
        let record = sample_record();
        let bytes = record.encode().unwrap();

        // Chop off half the payload tail
        let truncated = &bytes[..bytes.len() - 6];
        assert!(FileRecord::decode(truncated).is_err());

        let head = FileRecord::decode_head(truncated).unwrap();
        assert_eq!(head.id, "doc-1");
        assert_eq!(head.metadata.size, 11);
    }

    #[test]
    fn test_garbage_decodes_nowhere() {
        let garbage = [0xFFu8, 0xFF, 0xFF];
        assert!(FileRecord::decode(&garbage).is_err());
        assert!(FileRecord::decode_head(&garbage).is_err());
    }
}
