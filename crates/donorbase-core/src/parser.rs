//! Legacy address parser.
//!
//! Turns a free-text address into a [`StructuredAddress`] in four passes:
//!
//! 1. Strip a trailing six digit postal code (and the hyphen/space before it).
//! 2. Split the rest on commas, dropping empty segments.
//! 3. Scan segments right to left for a gazetteer region; the segment before the
//!    region is the city, everything before the city is the street line.
//! 4. Without a region, fall back on position: `line, ..., city, state`.
//!
//! The parser is best-effort and never fails. It holds no mutable state, so the
//! same input always yields the same output.

use crate::address::{StructuredAddress, DEFAULT_COUNTRY};
use crate::gazetteer::{Gazetteer, RegionMatchPolicy};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Six digits at the very end, not preceded by another digit.
const PINCODE_PATTERN: &str = r"(?:^|[^0-9])([0-9]{6})$";

static PINCODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PINCODE_PATTERN).expect("pincode pattern is valid"));

/// Separator between segments in a rebuilt street line.
const LINE_SEPARATOR: &str = ", ";

/// Parser for legacy address strings.
#[derive(Debug, Clone)]
pub struct AddressParser {
    gazetteer: Arc<Gazetteer>,
    policy: RegionMatchPolicy,
    country: String,
}

impl AddressParser {
    /// Create a parser over the given gazetteer.
    pub fn new(gazetteer: Arc<Gazetteer>) -> Self {
        Self {
            gazetteer,
            policy: RegionMatchPolicy::default(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Set the region match policy.
    pub fn with_policy(mut self, policy: RegionMatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the country written into every result.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Parse a legacy address.
    pub fn parse(&self, raw: Option<&str>) -> StructuredAddress {
        let mut address = StructuredAddress::empty(self.country.as_str());

        let text = match raw.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return address,
        };

        let (rest, pincode) = self.split_pincode(text);
        if let Some(pincode) = pincode {
            address.pincode = pincode.to_string();
        }

        let segments: Vec<&str> = rest
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            address.line = rest.trim().to_string();
            return address;
        }

        match self.find_region(&segments) {
            Some((index, state)) => {
                address.state = state.to_string();
                if index > 0 {
                    address.city = segments[index - 1].to_string();
                    address.line = segments[..index - 1].join(LINE_SEPARATOR);
                }
            }
            None => match segments.len() {
                1 => address.line = segments[0].to_string(),
                2 => {
                    address.line = segments[0].to_string();
                    address.city = segments[1].to_string();
                }
                n => {
                    address.state = segments[n - 1].to_string();
                    address.city = segments[n - 2].to_string();
                    address.line = segments[..n - 2].join(LINE_SEPARATOR);
                }
            },
        }

        address
    }

    /// Split a trailing postal code off `text`, returning the remainder and the code.
    fn split_pincode<'a>(&self, text: &'a str) -> (&'a str, Option<&'a str>) {
        let Some(digits) = PINCODE_REGEX
            .captures(text)
            .and_then(|caps| caps.get(1))
        else {
            return (text, None);
        };

        let rest = text[..digits.start()]
            .trim_end_matches(|c: char| c == '-' || c.is_whitespace());
        (rest, Some(digits.as_str()))
    }

    /// Rightmost segment naming a region, with the gazetteer spelling.
    fn find_region<'g>(&'g self, segments: &[&str]) -> Option<(usize, &'g str)> {
        segments
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, segment)| {
                self.gazetteer
                    .lookup(segment, self.policy)
                    .map(|state| (i, state))
            })
    }
}

impl Default for AddressParser {
    fn default() -> Self {
        Self::new(Arc::new(Gazetteer::india()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn address(line: &str, city: &str, state: &str, pincode: &str) -> StructuredAddress {
        StructuredAddress {
            line: line.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            pincode: pincode.to_string(),
        }
    }

    #[test]
    fn test_absent_and_empty() {
        let parser = AddressParser::default();
        let empty = address("", "", "", "");
        assert_eq!(parser.parse(None), empty);
        assert_eq!(parser.parse(Some("")), empty);
        assert_eq!(parser.parse(Some("   ")), empty);
    }

    #[test]
    fn test_full_address_with_pincode() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("12 MG Road, Pune, Maharashtra - 411001")),
            address("12 MG Road", "Pune", "Maharashtra", "411001")
        );
    }

    #[test]
    fn test_two_segments_without_region() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("12 MG Road, Pune")),
            address("12 MG Road", "Pune", "", "")
        );
    }

    #[test]
    fn test_abbreviation_in_last_segment() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("Shop 9, Baner, MH")),
            address("Shop 9", "Baner", "MH", "")
        );
    }

    #[test]
    fn test_positional_fallback() {
        let parser = AddressParser::default();
        assert_eq!(parser.parse(Some("A, B, C")), address("A", "B", "C", ""));
        assert_eq!(
            parser.parse(Some("House 4, Block B, Sector 9, Zirakpur, Mohali")),
            address("House 4, Block B, Sector 9", "Zirakpur", "Mohali", "")
        );
    }

    #[test]
    fn test_single_segment() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("Behind post office")),
            address("Behind post office", "", "", "")
        );
    }

    #[test]
    fn test_pincode_separators() {
        let parser = AddressParser::default();
        let expected = address("12 MG Road", "Pune", "Maharashtra", "411001");
        for raw in [
            "12 MG Road, Pune, Maharashtra 411001",
            "12 MG Road, Pune, Maharashtra-411001",
            "12 MG Road, Pune, Maharashtra,411001",
            "  12 MG Road, Pune, Maharashtra - 411001  ",
        ] {
            assert_eq!(parser.parse(Some(raw)), expected, "input: {raw:?}");
        }
    }

    #[test]
    fn test_pincode_must_be_exactly_six_digits() {
        let parser = AddressParser::default();
        let parsed = parser.parse(Some("12 MG Road, Pune 4110012"));
        assert_eq!(parsed.pincode, "");
        assert_eq!(parsed.city, "Pune 4110012");

        let parsed = parser.parse(Some("12 MG Road, Pune 41100"));
        assert_eq!(parsed.pincode, "");
    }

    #[test]
    fn test_pincode_only() {
        let parser = AddressParser::default();
        assert_eq!(parser.parse(Some("411001")), address("", "", "", "411001"));
        assert_eq!(parser.parse(Some(" - 411001")), address("", "", "", "411001"));
    }

    #[test]
    fn test_pincode_never_left_in_line() {
        let parser = AddressParser::default();
        let parsed = parser.parse(Some("House 5, Road 2 560001"));
        assert_eq!(parsed.pincode, "560001");
        assert!(!parsed.line.contains("560001"));
        assert!(!parsed.city.contains("560001"));
    }

    #[test]
    fn test_only_commas() {
        let parser = AddressParser::default();
        assert_eq!(parser.parse(Some(", ,")), address(", ,", "", "", ""));
    }

    #[test]
    fn test_region_at_first_segment() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("Maharashtra, Zzz")),
            address("", "", "Maharashtra", "")
        );
    }

    #[test]
    fn test_rightmost_region_wins() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("Kerala House, 3 Jantar Mantar Road, New Delhi, Delhi")),
            address("Kerala House, 3 Jantar Mantar Road", "New Delhi", "Delhi", "")
        );
    }

    #[test]
    fn test_trailing_country_is_dropped() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("7 Park Street, Kolkata, West Bengal, India 700016")),
            address("7 Park Street", "Kolkata", "West Bengal", "700016")
        );
    }

    #[test]
    fn test_case_insensitive_region() {
        let parser = AddressParser::default();
        assert_eq!(
            parser.parse(Some("1 Beach Road, Panaji, goa")),
            address("1 Beach Road", "Panaji", "Goa", "")
        );
    }

    #[test]
    fn test_containment_false_positive() {
        let parser = AddressParser::default();
        let parsed = parser.parse(Some("Flat 2, Goregaon"));
        assert_eq!(parsed.state, "GA");
        assert_eq!(parsed.city, "Flat 2");

        let strict = AddressParser::default().with_policy(RegionMatchPolicy::Exact);
        assert_eq!(
            strict.parse(Some("Flat 2, Goregaon")),
            address("Flat 2", "Goregaon", "", "")
        );
    }

    #[test]
    fn test_two_letter_codes_swallow_localities() {
        let parser = AddressParser::default();

        // "East" contains the Assam code; the city after it is dropped.
        assert_eq!(
            parser.parse(Some("22 Station Road, Andheri East, Mumbai")),
            address("", "22 Station Road", "AS", "")
        );
        // "Nagar" contains the Arunachal code.
        assert_eq!(
            parser.parse(Some("Flat 1, Shivaji Nagar, Pune - 411005")),
            address("", "Flat 1", "AR", "411005")
        );

        let strict = AddressParser::default().with_policy(RegionMatchPolicy::Exact);
        assert_eq!(
            strict.parse(Some("22 Station Road, Andheri East, Mumbai")),
            address("22 Station Road", "Andheri East", "Mumbai", "")
        );
    }

    #[test]
    fn test_custom_country() {
        let parser = AddressParser::default().with_country("Bharat");
        assert_eq!(parser.parse(None).country, "Bharat");
        assert_eq!(parser.parse(Some("A, B, C")).country, "Bharat");
    }

    #[test]
    fn test_deterministic() {
        let parser = AddressParser::default();
        let raw = Some("Plot 21, Sector 5, Salt Lake, Kolkata, WB - 700091");
        assert_eq!(parser.parse(raw), parser.parse(raw));
    }
}
