//! Reference catalog of lab tests and their normal ranges.
//!
//! The catalog is loaded once at startup and shared read-only across
//! requests. Every entry carries a canonical `key`; the extraction and
//! classification stages pass keys around, never display strings.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Accepted normal interval for a named lab test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Canonical identifier, stable across renames of the display name.
    pub key: String,
    /// Display name as it appears on lab reports.
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read reference data from {0}: {1}")]
    Load(String, String),

    #[error("Failed to parse {0}: {1}")]
    Parse(String, String),
}

/// Ordered, immutable set of reference ranges.
///
/// Order matters for extraction: when a generic pattern fuzzy-matches
/// more than one entry, the first one in catalog order wins.
pub struct ReferenceCatalog {
    ranges: Vec<ReferenceRange>,
}

/// Bundled default panel (common CBC / metabolic / lipid tests).
const BUILTIN_RANGES: &str = include_str!("../resources/reference_ranges.json");

impl ReferenceCatalog {
    /// Load the catalog from `reference_ranges.json` in the given directory.
    pub fn load(resources_dir: &Path) -> Result<Self, CatalogError> {
        let path = resources_dir.join("reference_ranges.json");
        let json = std::fs::read_to_string(&path)
            .map_err(|e| CatalogError::Load(path.display().to_string(), e.to_string()))?;
        let ranges: Vec<ReferenceRange> = serde_json::from_str(&json)
            .map_err(|e| CatalogError::Parse("reference_ranges.json".into(), e.to_string()))?;
        Ok(Self { ranges })
    }

    /// Catalog built from the bundled reference data.
    pub fn builtin() -> Self {
        let ranges = serde_json::from_str(BUILTIN_RANGES)
            .expect("bundled reference_ranges.json is valid");
        Self { ranges }
    }

    /// Look up a range by canonical key.
    pub fn get(&self, key: &str) -> Option<&ReferenceRange> {
        self.ranges.iter().find(|r| r.key == key)
    }

    /// Fuzzy-match a raw test name from a generic pattern against the
    /// catalog: the raw name contains the display name, or it contains
    /// the display name's first word. First hit in catalog order wins.
    pub fn fuzzy_match(&self, raw_name: &str) -> Option<&ReferenceRange> {
        let lowered = raw_name.to_lowercase();
        self.ranges.iter().find(|r| {
            let name = r.name.to_lowercase();
            if lowered.contains(&name) {
                return true;
            }
            match name.split_whitespace().next() {
                Some(first_word) => lowered.contains(first_word),
                None => false,
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
