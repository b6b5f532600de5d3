//! Migration configuration.

use crate::address::DEFAULT_COUNTRY;
use crate::eligibility::{
    EligibilitySelector, DEFAULT_COLLECTION, DEFAULT_LEGACY_FIELD, DEFAULT_STRUCTURED_FIELD,
};
use crate::error::Error;
use crate::gazetteer::RegionMatchPolicy;

/// Configuration for an address migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Collection holding donor records.
    pub collection: String,

    /// Field holding the free-text address. Never written.
    pub legacy_field: String,

    /// Field the structured address is written to.
    pub structured_field: String,

    /// Country assigned to every parsed address.
    pub country: String,

    /// How segments are matched against the gazetteer.
    pub match_policy: RegionMatchPolicy,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            legacy_field: DEFAULT_LEGACY_FIELD.to_string(),
            structured_field: DEFAULT_STRUCTURED_FIELD.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            match_policy: RegionMatchPolicy::default(),
        }
    }
}

impl MigrationConfig {
    /// Create a configuration with default field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the legacy address field.
    pub fn with_legacy_field(mut self, field: impl Into<String>) -> Self {
        self.legacy_field = field.into();
        self
    }

    /// Set the structured address field.
    pub fn with_structured_field(mut self, field: impl Into<String>) -> Self {
        self.structured_field = field.into();
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Set the region match policy.
    pub fn with_match_policy(mut self, policy: RegionMatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Check the configuration before a run.
    ///
    /// The structured field must differ from the legacy field, since writing it must
    /// never touch the original string.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("collection", &self.collection),
            ("legacy field", &self.legacy_field),
            ("structured field", &self.structured_field),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{name} must not be empty")));
            }
        }
        if self.legacy_field == self.structured_field {
            return Err(Error::Config(format!(
                "structured field '{}' would overwrite the legacy address",
                self.structured_field
            )));
        }
        Ok(())
    }

    /// The eligibility selector for this configuration.
    pub fn selector(&self) -> EligibilitySelector {
        EligibilitySelector::new(
            self.collection.as_str(),
            self.legacy_field.as_str(),
            self.structured_field.as_str(),
        )
    }
}
