//! Clinical classification of an extracted value against its
//! reference range.
//!
//! Thresholds relative to the reference [min, max]:
//!   value < min×0.7          → critical_low
//!   min×0.7 ≤ value < min    → low
//!   max < value ≤ max×1.5    → high
//!   value > max×1.5          → critical_high
//!   otherwise                → normal

use crate::catalog::ReferenceCatalog;
use crate::models::enums::ValueStatus;
use crate::models::ClassifiedValue;

use super::values::ExtractedValue;

const CRITICAL_LOW_FACTOR: f64 = 0.7;
const CRITICAL_HIGH_FACTOR: f64 = 1.5;

/// Explicit unit conversion table.
///
/// Currently one pair: mg/dL ↔ mmol/L with the ×18 glucose-family
/// factor. The pair is applied by unit alone, not per analyte; any pair
/// outside this table is treated as incomparable rather than compared raw.
fn convert_unit(value: f64, from: &str, to: &str) -> Option<f64> {
    match (from.to_lowercase().as_str(), to.to_lowercase().as_str()) {
        ("mmol/l", "mg/dl") => Some(value * 18.0),
        ("mg/dl", "mmol/l") => Some(value / 18.0),
        _ => None,
    }
}

/// Classify one extracted value. Pure: the result depends only on
/// (value, matched range, unit).
pub fn classify_value(catalog: &ReferenceCatalog, extracted: &ExtractedValue) -> ClassifiedValue {
    let Some(range) = catalog.get(&extracted.test_key) else {
        // Absence of a known range is never itself flagged.
        return ClassifiedValue {
            test_key: extracted.test_key.clone(),
            test_name: extracted.test_name.clone(),
            value: extracted.value,
            unit: extracted.unit.clone(),
            status: ValueStatus::Normal,
            normal_range: "Unknown".into(),
            explanation: format!(
                "No reference range is available for {}. Discuss this result with your doctor.",
                extracted.test_name
            ),
        };
    };

    let normal_range = format!("{}-{} {}", range.min, range.max, range.unit);

    // Unit normalization
    let compared = if extracted.unit.eq_ignore_ascii_case(&range.unit) {
        Some(extracted.value)
    } else {
        convert_unit(extracted.value, &extracted.unit, &range.unit)
    };

    let Some(value) = compared else {
        // Incomparable units: report, don't flag.
        return ClassifiedValue {
            test_key: extracted.test_key.clone(),
            test_name: extracted.test_name.clone(),
            value: extracted.value,
            unit: extracted.unit.clone(),
            status: ValueStatus::Normal,
            normal_range,
            explanation: format!(
                "{} was reported in {} and cannot be compared to its reference range of {}-{} {}. \
                 Review this result with your provider.",
                range.name, extracted.unit, range.min, range.max, range.unit
            ),
        };
    };

    let status = if value < range.min * CRITICAL_LOW_FACTOR {
        ValueStatus::CriticalLow
    } else if value < range.min {
        ValueStatus::Low
    } else if value > range.max * CRITICAL_HIGH_FACTOR {
        ValueStatus::CriticalHigh
    } else if value > range.max {
        ValueStatus::High
    } else {
        ValueStatus::Normal
    };

    let explanation = match status {
        ValueStatus::Low | ValueStatus::CriticalLow => format!(
            "{} is below the normal range of {}-{} {}.",
            range.name, range.min, range.max, range.unit
        ),
        ValueStatus::High | ValueStatus::CriticalHigh => format!(
            "{} is above the normal range of {}-{} {}.",
            range.name, range.min, range.max, range.unit
        ),
        ValueStatus::Normal => format!(
            "{} is within the normal range of {}-{} {}.",
            range.name, range.min, range.max, range.unit
        ),
    };

    ClassifiedValue {
        test_key: extracted.test_key.clone(),
        test_name: extracted.test_name.clone(),
        value: extracted.value,
        unit: extracted.unit.clone(),
        status,
        normal_range,
        explanation,
    }
}
