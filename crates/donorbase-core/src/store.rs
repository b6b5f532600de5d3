//! Record store collaborator.
//!
//! The migration only needs two operations from a store: a filtered, projected
//! query for the eligible set, and a single-field update by id. Each update must be
//! atomic on its own; nothing spans records.

use crate::address::StructuredAddress;
use crate::eligibility::{EligibilitySelector, EligibleRecord, RecordId};
use crate::error::StoreError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of eligible records and sink for structured addresses.
pub trait RecordStore {
    /// Return the records of `selector.collection` that `selector` matches, in store
    /// order, projected to the selector's fields.
    fn eligible_records(
        &self,
        selector: &EligibilitySelector,
    ) -> Result<Vec<EligibleRecord>, StoreError>;

    /// Set the structured address of one record, leaving every other field as is.
    fn set_structured_address(
        &self,
        selector: &EligibilitySelector,
        id: &RecordId,
        address: &StructuredAddress,
    ) -> Result<(), StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn eligible_records(
        &self,
        selector: &EligibilitySelector,
    ) -> Result<Vec<EligibleRecord>, StoreError> {
        (**self).eligible_records(selector)
    }

    fn set_structured_address(
        &self,
        selector: &EligibilitySelector,
        id: &RecordId,
        address: &StructuredAddress,
    ) -> Result<(), StoreError> {
        (**self).set_structured_address(selector, id, address)
    }
}

/// In-memory record store for testing.
///
/// Ignores the selector's collection and field names; every record lives in one
/// list. Updates to ids registered with [`fail_updates_for`](Self::fail_updates_for)
/// return a backend error.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<EligibleRecord>>,
    failing: Mutex<HashSet<RecordId>>,
    update_calls: AtomicU64,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records.
    pub fn with_records(records: impl IntoIterator<Item = EligibleRecord>) -> Self {
        let store = Self::new();
        store.records.lock().extend(records);
        store
    }

    /// Make every update of `id` fail.
    pub fn fail_updates_for(&self, id: impl Into<RecordId>) {
        self.failing.lock().insert(id.into());
    }

    /// Get a record by id.
    pub fn get(&self, id: &RecordId) -> Option<EligibleRecord> {
        self.records.lock().iter().find(|r| &r.id == id).cloned()
    }

    /// Number of update calls received, including failed ones.
    pub fn update_calls(&self) -> u64 {
        self.update_calls.load(Ordering::Relaxed)
    }
}

impl RecordStore for MemoryRecordStore {
    fn eligible_records(
        &self,
        selector: &EligibilitySelector,
    ) -> Result<Vec<EligibleRecord>, StoreError> {
        Ok(selector.select(self.records.lock().iter().cloned()))
    }

    fn set_structured_address(
        &self,
        _selector: &EligibilitySelector,
        id: &RecordId,
        address: &StructuredAddress,
    ) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);

        if self.failing.lock().contains(id) {
            return Err(StoreError::Backend(format!("injected failure for {id}")));
        }

        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.structured = Some(address.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_update() {
        let store = MemoryRecordStore::with_records([EligibleRecord::new("a", Some("x, y"))]);
        let selector = EligibilitySelector::default();
        let address = StructuredAddress {
            city: "y".to_string(),
            ..Default::default()
        };

        store
            .set_structured_address(&selector, &RecordId::new("a"), &address)
            .unwrap();

        let record = store.get(&RecordId::new("a")).unwrap();
        assert_eq!(record.structured, Some(address));
        assert_eq!(record.legacy_address.as_deref(), Some("x, y"));
        assert_eq!(store.update_calls(), 1);
        assert!(store.eligible_records(&selector).unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_missing_record() {
        let store = MemoryRecordStore::new();
        let err = store
            .set_structured_address(
                &EligibilitySelector::default(),
                &RecordId::new("missing"),
                &StructuredAddress::default(),
            )
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("missing".to_string()));
    }

    #[test]
    fn test_memory_store_injected_failure() {
        let store = MemoryRecordStore::with_records([EligibleRecord::new("a", Some("x, y"))]);
        store.fail_updates_for("a");

        let result = store.set_structured_address(
            &EligibilitySelector::default(),
            &RecordId::new("a"),
            &StructuredAddress::default(),
        );
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert!(store.get(&RecordId::new("a")).unwrap().structured.is_none());
    }
}
