//! Per-category score reports (`/api/secure-scores/{identity|data|apps}/...`)

use serde::{Deserialize, Serialize};

use super::commentary::AnalystCommentary;
use super::device::UnencryptedDevice;
use super::mfa::MfaEvaluation;
use super::score::CategoryScore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub display_name: String,
    pub user_principal_name: String,
    #[serde(default)]
    pub mfa_registered: bool,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFinding {
    pub name: String,
    pub status: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityReport {
    #[serde(flatten)]
    pub score: CategoryScore,
    #[serde(default)]
    pub mfa: MfaEvaluation,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub commentary: Option<AnalystCommentary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataReport {
    #[serde(flatten)]
    pub score: CategoryScore,
    #[serde(default)]
    pub unencrypted_devices: Vec<UnencryptedDevice>,
    #[serde(default)]
    pub commentary: Option<AnalystCommentary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppsReport {
    #[serde(flatten)]
    pub score: CategoryScore,
    #[serde(default)]
    pub findings: Vec<CloudFinding>,
    #[serde(default)]
    pub commentary: Option<AnalystCommentary>,
}
