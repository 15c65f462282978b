use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dashboard element whose status is toggled by a person, not computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualWidget {
    pub widget_id: String,
    pub title: String,
    pub enabled: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}
