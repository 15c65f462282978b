//! Audit log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    TenantCreated,
    Microsoft365Connected,
    GuaranteesUpdated,
    WidgetToggled,
    TenantAccessUpdated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::TenantCreated => "tenant_created",
            AuditAction::Microsoft365Connected => "microsoft365_connected",
            AuditAction::GuaranteesUpdated => "guarantees_updated",
            AuditAction::WidgetToggled => "widget_toggled",
            AuditAction::TenantAccessUpdated => "tenant_access_updated",
        }
    }
}

/// Body of `POST /api/audit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    pub action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            tenant_id: None,
            target: None,
            detail: None,
        }
    }

    pub fn tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Stored entry as returned by `GET /api/audit-logs`. `action` stays free-form on reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_wire_shape() {
        let entry = NewAuditEntry::new(AuditAction::WidgetToggled)
            .tenant("t1")
            .target("mfa-banner");

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"action": "widget_toggled", "tenantId": "t1", "target": "mfa-banner"})
        );
        assert_eq!(entry.action.as_str(), "widget_toggled");
    }
}
