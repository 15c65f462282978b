//! Analyst commentary attached to a dashboard page

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::score::deserialize_flexible_date;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystComment {
    pub comment: String,
    pub author: String,
    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousComment {
    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub date: NaiveDate,
    pub note: String,
}

/// Latest comment plus history, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystCommentary {
    pub latest: AnalystComment,
    #[serde(default)]
    pub previous: Vec<PreviousComment>,
}
