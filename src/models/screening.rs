use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ValueStatus;

/// One lab value after classification against its reference range.
///
/// Immutable once built: `status` is a pure function of
/// (value, matched range, unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedValue {
    /// Canonical catalog key (e.g. "glucose"), carried forward from
    /// extraction so classification never re-matches on display names.
    pub test_key: String,
    pub test_name: String,
    pub value: f64,
    pub unit: String,
    pub status: ValueStatus,
    pub normal_range: String,
    pub explanation: String,
}

/// One uploaded bloodwork document and its derived analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub values: Vec<ClassifiedValue>,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub flagged_count: usize,
}

impl Screening {
    /// Build a screening record. `flagged_count` is derived here so it
    /// always equals the number of values with a non-normal status.
    pub fn new(
        user_id: String,
        file_name: String,
        values: Vec<ClassifiedValue>,
        summary: String,
        recommendations: Vec<String>,
    ) -> Self {
        let flagged_count = values.iter().filter(|v| v.status.is_flagged()).count();
        Self {
            id: Uuid::new_v4(),
            user_id,
            file_name,
            uploaded_at: Utc::now(),
            values,
            summary,
            recommendations,
            flagged_count,
        }
    }
}
