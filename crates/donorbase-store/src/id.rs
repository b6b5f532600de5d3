//! Document identifiers.

use crate::error::Error;
use crate::key::current_timestamp;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of a document id in bytes.
pub const DOCUMENT_ID_SIZE: usize = 16;

/// 16-byte document identifier, rendered as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub [u8; DOCUMENT_ID_SIZE]);

impl DocumentId {
    /// Generate a new id (UUID v4 layout, time-ordered high bits).
    pub fn generate() -> Self {
        // Counter to keep ids unique within one timestamp
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let now = current_timestamp();
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        let mut id = [0u8; DOCUMENT_ID_SIZE];
        id[..8].copy_from_slice(&now.to_be_bytes());
        id[8..].copy_from_slice(&counter.to_be_bytes());

        // UUID version 4 and variant bits
        id[6] = (id[6] & 0x0f) | 0x40;
        id[8] = (id[8] & 0x3f) | 0x80;

        Self(id)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; DOCUMENT_ID_SIZE] {
        &self.0
    }

    /// Build an id from a byte slice of the right length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; DOCUMENT_ID_SIZE] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidId(s.to_string()))?;
        Self::from_slice(&bytes).ok_or_else(|| Error::InvalidId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_roundtrip() {
        let id = DocumentId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(text.parse::<DocumentId>().unwrap(), id);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!("xyz".parse::<DocumentId>(), Err(Error::InvalidId(_))));
        assert!(matches!("abcd".parse::<DocumentId>(), Err(Error::InvalidId(_))));
    }
}
