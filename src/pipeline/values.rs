//! Value extraction: scan extracted text line by line for
//! (test name, numeric value, unit) triples.
//!
//! Two passes run over every line:
//! - catalog pass: does the line mention a catalog entry's display name?
//!   If so, take the first "number + unit token" on that line.
//! - generic pass: "name : number unit" and "number unit name" patterns,
//!   with the captured name fuzzy-matched against the catalog.
//!
//! Both passes resolve to a canonical catalog key. The merge policy is
//! explicit: one value per key, a catalog-pass candidate beats a
//! generic-pass candidate regardless of document order, and within the
//! same pass the first occurrence wins. Output order is first-seen order.

use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};

use crate::catalog::ReferenceCatalog;

/// First "number followed by a unit token" occurrence on a line.
static NUMBER_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*([A-Za-z%][A-Za-z0-9/%^.]*)").unwrap()
});

/// "name : number unit" (also accepts `=` as the separator).
static NAME_COLON_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z ()/-]{0,40}?)\s*[:=]\s*(-?\d+(?:\.\d+)?)\s*([A-Za-z%][A-Za-z0-9/%^.]*)")
        .unwrap()
});

/// "number unit name".
static VALUE_BEFORE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*([A-Za-z%][A-Za-z0-9/%^.]*)\s+([A-Za-z][A-Za-z ()/-]{0,40})")
        .unwrap()
});

/// Which pass produced a measurement. Catalog beats Pattern on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Catalog,
    Pattern,
}

/// One measurement pulled out of the document text.
#[derive(Debug, Clone)]
pub struct ExtractedValue {
    pub test_key: String,
    pub test_name: String,
    pub value: f64,
    pub unit: String,
    pub source: MatchSource,
}

/// Line scanner with per-entry display-name patterns precompiled.
pub struct ValueExtractor {
    catalog: Arc<ReferenceCatalog>,
    name_patterns: Vec<(String, Regex)>,
}

impl ValueExtractor {
    pub fn new(catalog: Arc<ReferenceCatalog>) -> Self {
        // Display names are escaped so parentheses match literally,
        // e.g. "White Blood Cells (WBC)".
        let name_patterns = catalog
            .iter()
            .map(|range| {
                let pattern = RegexBuilder::new(&regex::escape(&range.name))
                    .case_insensitive(true)
                    .build()
                    .expect("escaped display name is a valid pattern");
                (range.key.clone(), pattern)
            })
            .collect();
        Self {
            catalog,
            name_patterns,
        }
    }

    /// Scan the whole document. Returns at most one value per catalog key,
    /// in first-seen order. May be empty; the caller decides whether that
    /// is an error.
    pub fn extract(&self, text: &str) -> Vec<ExtractedValue> {
        let mut merged: Vec<ExtractedValue> = Vec::new();

        for line in text.lines() {
            for candidate in self.scan_line(line) {
                match merged.iter_mut().find(|v| v.test_key == candidate.test_key) {
                    None => merged.push(candidate),
                    Some(existing) => {
                        // Catalog-sourced reading replaces a generic one for
                        // the same test; everything else keeps the first.
                        if existing.source == MatchSource::Pattern
                            && candidate.source == MatchSource::Catalog
                        {
                            *existing = candidate;
                        }
                    }
                }
            }
        }

        tracing::debug!(count = merged.len(), "Value extraction complete");
        merged
    }

    fn scan_line(&self, line: &str) -> Vec<ExtractedValue> {
        let mut candidates = Vec::new();

        // Catalog pass
        for (key, pattern) in &self.name_patterns {
            if !pattern.is_match(line) {
                continue;
            }
            if let Some(caps) = NUMBER_UNIT.captures(line) {
                if let (Some(range), Ok(value)) =
                    (self.catalog.get(key), caps[1].parse::<f64>())
                {
                    candidates.push(ExtractedValue {
                        test_key: range.key.clone(),
                        test_name: range.name.clone(),
                        value,
                        unit: caps[2].to_string(),
                        source: MatchSource::Catalog,
                    });
                }
            }
        }

        // Generic pass
        for caps in NAME_COLON_VALUE.captures_iter(line) {
            self.push_fuzzy(&mut candidates, &caps[1], &caps[2], &caps[3]);
        }
        for caps in VALUE_BEFORE_NAME.captures_iter(line) {
            self.push_fuzzy(&mut candidates, &caps[3], &caps[1], &caps[2]);
        }

        candidates
    }

    fn push_fuzzy(&self, candidates: &mut Vec<ExtractedValue>, name: &str, value: &str, unit: &str) {
        let Some(range) = self.catalog.fuzzy_match(name.trim()) else {
            return;
        };
        let Ok(value) = value.parse::<f64>() else {
            return;
        };
        candidates.push(ExtractedValue {
            test_key: range.key.clone(),
            test_name: range.name.clone(),
            value,
            unit: unit.to_string(),
            source: MatchSource::Pattern,
        });
    }
}

/// Short prefix of the extracted text, used when no values were found so
/// the caller can show the user what the parser saw.
pub fn text_preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 240;
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}
