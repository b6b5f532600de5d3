//! Reference table of known regions.
//!
//! The gazetteer is lookup-only. It is built once, shared behind an `Arc`, and
//! passed into the parser explicitly.

/// A state or union territory with its accepted abbreviations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Full name, as it should appear in a structured address.
    pub name: String,
    /// Short forms (vehicle registration style codes, common alternates).
    pub abbreviations: Vec<String>,
}

impl Region {
    /// Create a region with the given abbreviations.
    pub fn new(name: impl Into<String>, abbreviations: &[&str]) -> Self {
        Self {
            name: name.into(),
            abbreviations: abbreviations.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// How a segment is compared against gazetteer entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionMatchPolicy {
    /// Exact match, falling back to substring containment.
    ///
    /// Localities that embed a region name or code (e.g. "Goregaon" contains "GA")
    /// will match. This is the behaviour historical migrations ran with.
    #[default]
    Containment,
    /// Exact (case-insensitive) match only.
    Exact,
}

/// One searchable spelling with its case-folded form.
#[derive(Debug, Clone)]
struct Entry {
    text: String,
    folded: String,
}

impl Entry {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            folded: text.to_lowercase(),
        }
    }
}

/// Immutable table of region names and abbreviations.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    regions: Vec<Region>,
    names: Vec<Entry>,
    abbreviations: Vec<Entry>,
}

impl Gazetteer {
    /// Build a gazetteer from regions. Order is significant for containment matches.
    pub fn new(regions: Vec<Region>) -> Self {
        let names = regions.iter().map(|r| Entry::new(&r.name)).collect();
        let abbreviations = regions
            .iter()
            .flat_map(|r| r.abbreviations.iter().map(|a| Entry::new(a)))
            .collect();

        Self {
            regions,
            names,
            abbreviations,
        }
    }

    /// States and union territories of India.
    pub fn india() -> Self {
        Self::new(vec![
            Region::new("Andhra Pradesh", &["AP"]),
            Region::new("Arunachal Pradesh", &["AR"]),
            Region::new("Assam", &["AS"]),
            Region::new("Bihar", &["BR"]),
            Region::new("Chhattisgarh", &["CG"]),
            Region::new("Goa", &["GA"]),
            Region::new("Gujarat", &["GJ"]),
            Region::new("Haryana", &["HR"]),
            Region::new("Himachal Pradesh", &["HP"]),
            Region::new("Jharkhand", &["JH"]),
            Region::new("Karnataka", &["KA"]),
            Region::new("Kerala", &["KL"]),
            Region::new("Madhya Pradesh", &["MP"]),
            Region::new("Maharashtra", &["MH"]),
            Region::new("Manipur", &["MN"]),
            Region::new("Meghalaya", &["ML"]),
            Region::new("Mizoram", &["MZ"]),
            Region::new("Nagaland", &["NL"]),
            Region::new("Odisha", &["OD", "Orissa"]),
            Region::new("Punjab", &["PB"]),
            Region::new("Rajasthan", &["RJ"]),
            Region::new("Sikkim", &["SK"]),
            Region::new("Tamil Nadu", &["TN"]),
            Region::new("Telangana", &["TS", "TG"]),
            Region::new("Tripura", &["TR"]),
            Region::new("Uttar Pradesh", &["UP"]),
            Region::new("Uttarakhand", &["UK", "Uttaranchal"]),
            Region::new("West Bengal", &["WB"]),
            Region::new("Andaman and Nicobar Islands", &["AN"]),
            Region::new("Chandigarh", &["CH"]),
            Region::new("Dadra and Nagar Haveli and Daman and Diu", &["DN", "DD"]),
            Region::new("Delhi", &["DL", "New Delhi", "NCT of Delhi"]),
            Region::new("Jammu and Kashmir", &["JK", "J&K"]),
            Region::new("Ladakh", &["LA"]),
            Region::new("Lakshadweep", &["LD"]),
            Region::new("Puducherry", &["PY", "Pondicherry"]),
        ])
    }

    /// The regions this gazetteer was built from.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of searchable spellings (names plus abbreviations).
    pub fn len(&self) -> usize {
        self.names.len() + self.abbreviations.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the gazetteer spelling a segment refers to.
    ///
    /// Exact matches win over containment. Under containment, full names are
    /// tried before abbreviations, each in table order. The returned string is the
    /// entry as spelled in the table, not the segment.
    pub fn lookup(&self, segment: &str, policy: RegionMatchPolicy) -> Option<&str> {
        let folded = segment.trim().to_lowercase();
        if folded.is_empty() {
            return None;
        }

        let mut entries = self.names.iter().chain(self.abbreviations.iter());
        if let Some(entry) = entries.find(|e| e.folded == folded) {
            return Some(&entry.text);
        }

        if policy == RegionMatchPolicy::Exact {
            return None;
        }

        self.names
            .iter()
            .chain(self.abbreviations.iter())
            .find(|e| folded.contains(&e.folded))
            .map(|e| e.text.as_str())
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::india()
    }
}
