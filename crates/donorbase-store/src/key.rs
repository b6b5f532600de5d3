//! Versioned key encoding.

use crate::id::{DocumentId, DOCUMENT_ID_SIZE};
use std::fmt;

/// Size of the version in bytes.
pub const VERSION_SIZE: usize = 8;

/// Total key size.
pub const KEY_SIZE: usize = DOCUMENT_ID_SIZE + VERSION_SIZE;

/// A document id paired with a version.
///
/// Key format: `[document_id (16 bytes)][version (8 bytes, big-endian)]`
///
/// Big-endian versions keep byte order equal to numeric order, so a range scan over
/// one document yields its versions oldest first.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionedKey {
    /// Document identifier.
    pub document_id: DocumentId,

    /// Version, in microseconds since the Unix epoch.
    pub version: u64,
}

impl VersionedKey {
    /// Create a new versioned key.
    pub fn new(document_id: DocumentId, version: u64) -> Self {
        Self {
            document_id,
            version,
        }
    }

    /// Key for the version following `previous`.
    ///
    /// Uses the current time, bumped past `previous` when the clock has not moved on.
    pub fn next(document_id: DocumentId, previous: Option<u64>) -> Self {
        let now = current_timestamp();
        let version = match previous {
            Some(prev) if prev >= now => prev + 1,
            _ => now,
        };
        Self::new(document_id, version)
    }

    /// Encode the key to bytes.
    pub fn encode(&self) -> [u8; KEY_SIZE] {
        let mut buf = [0u8; KEY_SIZE];
        buf[..DOCUMENT_ID_SIZE].copy_from_slice(self.document_id.as_bytes());
        buf[DOCUMENT_ID_SIZE..].copy_from_slice(&self.version.to_be_bytes());
        buf
    }

    /// Decode a key from bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_SIZE {
            return None;
        }

        let document_id = DocumentId::from_slice(&bytes[..DOCUMENT_ID_SIZE])?;
        let version = u64::from_be_bytes(bytes[DOCUMENT_ID_SIZE..].try_into().ok()?);

        Some(Self::new(document_id, version))
    }

    /// Smallest key of a document.
    pub fn min_for(document_id: DocumentId) -> Self {
        Self::new(document_id, 0)
    }

    /// Largest key of a document.
    pub fn max_for(document_id: DocumentId) -> Self {
        Self::new(document_id, u64::MAX)
    }
}

impl fmt::Debug for VersionedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedKey")
            .field("document_id", &self.document_id.to_string())
            .field("version", &self.version)
            .finish()
    }
}

/// Current time in microseconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
