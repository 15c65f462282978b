//! Secure score snapshots

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// One point of the secure score series. Order inside a series is chronological as delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SecureScoreEntry {
    pub month: String,

    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub date: NaiveDate,

    #[validate(range(min = 0.0, max = 100.0, message = "Percentage must be between 0 and 100"))]
    pub percentage: f64,

    #[serde(default)]
    pub comparative: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreCategory {
    Identity,
    Data,
    Apps,
}

impl ScoreCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Identity => "identity",
            ScoreCategory::Data => "data",
            ScoreCategory::Apps => "apps",
        }
    }

    pub fn all() -> [ScoreCategory; 3] {
        [ScoreCategory::Identity, ScoreCategory::Data, ScoreCategory::Apps]
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    #[validate(range(min = 0.0, max = 100.0, message = "Percentage must be between 0 and 100"))]
    pub percentage: f64,

    #[serde(default)]
    pub comparative: Option<f64>,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date.
pub fn parse_flexible_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("unrecognised date: {}", raw))
}

pub(crate) fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_accepts_plain_and_timestamp_dates() {
        let plain: SecureScoreEntry = serde_json::from_value(json!({
            "month": "Jan", "date": "2024-01-31", "percentage": 54.5, "comparative": 48.0
        }))
        .unwrap();
        let stamped: SecureScoreEntry = serde_json::from_value(json!({
            "month": "Jan", "date": "2024-01-31T23:10:00Z", "percentage": 54.5
        }))
        .unwrap();

        assert_eq!(plain.date, stamped.date);
        assert_eq!(stamped.comparative, None);
    }

    #[test]
    fn test_entry_rejects_garbage_date() {
        let result = serde_json::from_value::<SecureScoreEntry>(json!({
            "month": "Jan", "date": "last tuesday", "percentage": 10.0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_percentage_range_validation() {
        let mut entry = SecureScoreEntry {
            month: "Feb".into(),
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            percentage: 100.0,
            comparative: None,
        };
        assert!(entry.validate().is_ok());

        entry.percentage = 100.5;
        assert!(entry.validate().is_err());
    }
}
