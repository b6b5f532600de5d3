//! Structured address value.

use serde::{Deserialize, Serialize};

/// Country assigned to every parsed address. There is no country detection.
pub const DEFAULT_COUNTRY: &str = "India";

/// Structured form of a donor address.
///
/// Every field deserializes to an empty string when missing, so partially written
/// values from other tools still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuredAddress {
    /// Street line: everything before the city.
    #[serde(default)]
    pub line: String,
    /// City or locality.
    #[serde(default)]
    pub city: String,
    /// State or union territory.
    #[serde(default)]
    pub state: String,
    /// Country, always the configured default.
    #[serde(default)]
    pub country: String,
    /// Six digit postal code, or empty.
    #[serde(default)]
    pub pincode: String,
}

impl StructuredAddress {
    /// An address with every field empty except `country`.
    pub fn empty(country: impl Into<String>) -> Self {
        Self {
            line: String::new(),
            city: String::new(),
            state: String::new(),
            country: country.into(),
            pincode: String::new(),
        }
    }

    /// Whether the address carries no location signal at all.
    ///
    /// `line` and `country` do not count: a bare street line is not enough to
    /// justify a write.
    pub fn is_low_confidence(&self) -> bool {
        self.city.is_empty() && self.state.is_empty() && self.pincode.is_empty()
    }

    /// Whether this value already counts as migrated.
    pub fn has_city(&self) -> bool {
        !self.city.is_empty()
    }
}

impl Default for StructuredAddress {
    fn default() -> Self {
        Self::empty(DEFAULT_COUNTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_country() {
        let address = StructuredAddress::default();
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert!(address.line.is_empty());
        assert!(address.is_low_confidence());
    }

    #[test]
    fn test_low_confidence() {
        let mut address = StructuredAddress::default();
        address.line = "12 MG Road".to_string();
        assert!(address.is_low_confidence());

        address.pincode = "411001".to_string();
        assert!(!address.is_low_confidence());
        assert!(!address.has_city());
    }

    #[test]
    fn test_deserialize_partial() {
        let address: StructuredAddress =
            serde_json::from_str(r#"{"city": "Pune"}"#).unwrap();
        assert_eq!(address.city, "Pune");
        assert!(address.state.is_empty());
        assert!(address.country.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(StructuredAddress::default()).unwrap();
        let object = value.as_object().unwrap();
        for field in ["line", "city", "state", "country", "pincode"] {
            assert!(object.contains_key(field), "missing {field}");
        }
        assert_eq!(object.len(), 5);
    }
}
