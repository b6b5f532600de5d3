//! On-disk envelope for one document version.

use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};

/// A stored document version with metadata.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Record {
    /// Collection the document belongs to.
    pub collection: String,

    /// JSON-encoded document body.
    pub body: Vec<u8>,

    /// Write timestamp in microseconds since Unix epoch.
    pub created_at: u64,
}

impl Record {
    /// Create a record for a JSON body with the current timestamp.
    pub fn new(collection: impl Into<String>, body: &serde_json::Value) -> Result<Self, Error> {
        let body = serde_json::to_vec(body).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Self {
            collection: collection.into(),
            body,
            created_at: super::key::current_timestamp(),
        })
    }

    /// Decode the JSON body.
    pub fn json(&self) -> Result<serde_json::Value, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Serialize the record to bytes using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a record from bytes using rkyv.
    ///
    /// sled hands out values without alignment guarantees, so the bytes are copied
    /// into an aligned buffer first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned[..])
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
