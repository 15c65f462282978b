use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device compliance snapshot, display-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnencryptedDevice {
    pub device_name: String,
    pub owner: String,
    pub operating_system: String,
    #[serde(default)]
    pub os_version: Option<String>,
    pub compliance_state: String,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl UnencryptedDevice {
    pub fn is_compliant(&self) -> bool {
        self.compliance_state.eq_ignore_ascii_case("compliant")
    }
}
