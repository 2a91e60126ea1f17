use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Where a lab value sits relative to its reference range.
///
/// "Critical" means at least 30% below the minimum or 50% above the
/// maximum; "low"/"high" cover everything else outside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueStatus {
    Normal,
    Low,
    High,
    CriticalLow,
    CriticalHigh,
}

impl ValueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Low => "low",
            Self::High => "high",
            Self::CriticalLow => "critical_low",
            Self::CriticalHigh => "critical_high",
        }
    }

    /// A flagged value is any value outside its reference range.
    pub fn is_flagged(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::CriticalLow | Self::CriticalHigh)
    }
}

impl std::str::FromStr for ValueStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            "high" => Ok(Self::High),
            "critical_low" => Ok(Self::CriticalLow),
            "critical_high" => Ok(Self::CriticalHigh),
            _ => Err(DatabaseError::InvalidEnum {
                field: "ValueStatus".into(),
                value: s.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn as_str_round_trips() {
        for status in [
            ValueStatus::Normal,
            ValueStatus::Low,
            ValueStatus::High,
            ValueStatus::CriticalLow,
            ValueStatus::CriticalHigh,
        ] {
            assert_eq!(ValueStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_string_is_rejected() {
        assert!(ValueStatus::from_str("borderline").is_err());
    }

    #[test]
    fn only_normal_is_unflagged() {
        assert!(!ValueStatus::Normal.is_flagged());
        assert!(ValueStatus::Low.is_flagged());
        assert!(ValueStatus::CriticalHigh.is_flagged());
    }

    #[test]
    fn critical_variants() {
        assert!(ValueStatus::CriticalLow.is_critical());
        assert!(ValueStatus::CriticalHigh.is_critical());
        assert!(!ValueStatus::High.is_critical());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ValueStatus::CriticalHigh).unwrap();
        assert_eq!(json, "\"critical_high\"");
    }
}
