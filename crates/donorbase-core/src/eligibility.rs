//! Selection of records that still need migration.
//!
//! A record is eligible when it has a non-blank legacy address and no structured
//! address with a city. Once a run writes a city, the record drops out of every later
//! selection, which is what makes repeated runs converge to zero writes.

use crate::address::StructuredAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a store identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A stored record projected to the fields the migration reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleRecord {
    /// Record identifier.
    pub id: RecordId,
    /// The free-text address, if the record has one.
    pub legacy_address: Option<String>,
    /// The structured address, if one was written before.
    pub structured: Option<StructuredAddress>,
}

impl EligibleRecord {
    /// Create a record with a legacy address and no structured value.
    pub fn new(id: impl Into<RecordId>, legacy_address: Option<&str>) -> Self {
        Self {
            id: id.into(),
            legacy_address: legacy_address.map(str::to_string),
            structured: None,
        }
    }

    /// Attach an existing structured value.
    pub fn with_structured(mut self, structured: StructuredAddress) -> Self {
        self.structured = Some(structured);
        self
    }
}

/// Default collection holding donor records.
pub const DEFAULT_COLLECTION: &str = "donors";

/// Default name of the free-text address field.
pub const DEFAULT_LEGACY_FIELD: &str = "address";

/// Default name of the structured address field.
pub const DEFAULT_STRUCTURED_FIELD: &str = "addressDetails";

/// Predicate selecting records that still need migration.
///
/// Besides the predicate itself, the selector names the collection and the two
/// fields a store has to project to evaluate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilitySelector {
    /// Collection to query.
    pub collection: String,
    /// Field holding the legacy address string.
    pub legacy_field: String,
    /// Field holding the structured address.
    pub structured_field: String,
}

impl EligibilitySelector {
    /// Create a selector over the given collection and fields.
    pub fn new(
        collection: impl Into<String>,
        legacy_field: impl Into<String>,
        structured_field: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            legacy_field: legacy_field.into(),
            structured_field: structured_field.into(),
        }
    }

    /// Whether a record still needs migration.
    pub fn matches(&self, record: &EligibleRecord) -> bool {
        let has_legacy = record
            .legacy_address
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());

        let migrated = record
            .structured
            .as_ref()
            .is_some_and(StructuredAddress::has_city);

        has_legacy && !migrated
    }

    /// Keep only the eligible records, preserving order.
    pub fn select<I>(&self, records: I) -> Vec<EligibleRecord>
    where
        I: IntoIterator<Item = EligibleRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

impl Default for EligibilitySelector {
    fn default() -> Self {
        Self::new(
            DEFAULT_COLLECTION,
            DEFAULT_LEGACY_FIELD,
            DEFAULT_STRUCTURED_FIELD,
        )
    }
}
