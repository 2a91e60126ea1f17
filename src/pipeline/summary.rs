//! Summary synthesis: turn the per-value statuses into an overall
//! narrative plus a prioritized recommendation list.

use crate::models::enums::ValueStatus;
use crate::models::ClassifiedValue;

/// Narrative output for a screening.
#[derive(Debug, Clone)]
pub struct ScreeningSummary {
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Build the summary. Branches are strictly priority-ordered and
/// mutually exclusive: critical beats high/low beats all-normal.
pub fn summarize(values: &[ClassifiedValue]) -> ScreeningSummary {
    let critical = values.iter().filter(|v| v.status.is_critical()).count();
    let high = values.iter().filter(|v| v.status == ValueStatus::High).count();
    let low = values.iter().filter(|v| v.status == ValueStatus::Low).count();

    let (mut summary, recommendations) = if critical > 0 {
        (
            format!(
                "Urgent: {critical} critical value{} detected in this report.",
                plural(critical)
            ),
            vec![
                "See a doctor promptly to review the critical values.".to_string(),
                "Seek emergency care if you are experiencing symptoms.".to_string(),
            ],
        )
    } else if high > 0 || low > 0 {
        (
            format!(
                "Some values are outside the normal range: {high} high and {low} low.",
            ),
            vec![
                "Consult your healthcare provider about the flagged values.".to_string(),
                "Consider lifestyle changes such as diet and exercise.".to_string(),
            ],
        )
    } else {
        (
            "All measured values are within their normal ranges.".to_string(),
            vec![
                "Maintain healthy habits.".to_string(),
                "Schedule regular check-ups.".to_string(),
            ],
        )
    };

    summary.push_str(" See the detailed results table for each value.");

    ScreeningSummary {
        summary,
        recommendations,
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
