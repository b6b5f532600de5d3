//! [`RecordStore`] implementation for the document store.
//!
//! Donor documents are projected onto the two address fields the selector names.
//! Values of the wrong shape are normalized rather than trusted: a legacy address
//! that is not a string counts as absent, and a structured value that does not
//! deserialize counts as not yet written.

use crate::engine::{json_kind, Document, DocumentStore};
use crate::error::Error;
use crate::id::DocumentId;
use donorbase_core::{
    EligibilitySelector, EligibleRecord, RecordId, RecordStore, StoreError, StructuredAddress,
};
use serde_json::Value;

impl DocumentStore {
    /// Project a document onto the selector's fields.
    pub fn project(&self, document: &Document, selector: &EligibilitySelector) -> EligibleRecord {
        let legacy_address = match document.body.get(&selector.legacy_field) {
            None | Some(Value::Null) => None,
            Some(Value::String(address)) => Some(address.clone()),
            Some(other) => {
                tracing::debug!(
                    id = %document.id,
                    field = %selector.legacy_field,
                    kind = json_kind(other),
                    "legacy address is not a string, treating as absent"
                );
                None
            }
        };

        let structured = match document.body.get(&selector.structured_field) {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<StructuredAddress>(value.clone()) {
                Ok(address) => Some(address),
                Err(e) => {
                    tracing::warn!(
                        id = %document.id,
                        field = %selector.structured_field,
                        error = %e,
                        "unreadable structured address, treating as absent"
                    );
                    None
                }
            },
        };

        EligibleRecord {
            id: RecordId::new(document.id.to_string()),
            legacy_address,
            structured,
        }
    }
}

impl RecordStore for DocumentStore {
    fn eligible_records(
        &self,
        selector: &EligibilitySelector,
    ) -> Result<Vec<EligibleRecord>, StoreError> {
        let mut records = Vec::new();

        for result in self.scan(&selector.collection) {
            let document = match result {
                Ok(document) => document,
                // Undecodable documents cannot be evaluated; leave them out.
                Err(e @ (Error::Deserialization(_) | Error::InvalidDocument(_))) => {
                    tracing::warn!(error = %e, "skipping unreadable document");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let record = self.project(&document, selector);
            if selector.matches(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn set_structured_address(
        &self,
        selector: &EligibilitySelector,
        id: &RecordId,
        address: &StructuredAddress,
    ) -> Result<(), StoreError> {
        if selector.structured_field == selector.legacy_field {
            return Err(StoreError::InvalidDocument {
                id: id.to_string(),
                reason: "refusing to overwrite the legacy address field".to_string(),
            });
        }

        let document_id: DocumentId = id.as_str().parse()?;
        let value =
            serde_json::to_value(address).map_err(|e| StoreError::Backend(e.to_string()))?;

        self.set_field(
            &selector.collection,
            &document_id,
            &selector.structured_field,
            value,
        )
        .map_err(|e| match e {
            Error::InvalidDocument(reason) => StoreError::InvalidDocument {
                id: id.to_string(),
                reason,
            },
            other => other.into(),
        })?;

        Ok(())
    }
}
