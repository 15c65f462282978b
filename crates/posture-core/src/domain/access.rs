//! Dashboard users and their tenant access

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub tenant_ids: BTreeSet<String>,
}

/// Body of `PUT /api/users/:id/tenants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantAccessRequest {
    pub tenant_ids: Vec<String>,
}

/// Tenant selection being edited for one user before it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantAccessDraft {
    pub user_id: String,
    selection: BTreeSet<String>,
    original: BTreeSet<String>,
}

impl TenantAccessDraft {
    pub fn for_user(user: &UserModel) -> Self {
        Self {
            user_id: user.id.clone(),
            selection: user.tenant_ids.clone(),
            original: user.tenant_ids.clone(),
        }
    }

    /// Flip membership of `tenant_id`; returns whether it is now selected.
    pub fn toggle(&mut self, tenant_id: &str) -> bool {
        if self.selection.remove(tenant_id) {
            false
        } else {
            self.selection.insert(tenant_id.to_string());
            true
        }
    }

    pub fn is_selected(&self, tenant_id: &str) -> bool {
        self.selection.contains(tenant_id)
    }

    pub fn is_dirty(&self) -> bool {
        self.selection != self.original
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn to_request(&self) -> TenantAccessRequest {
        TenantAccessRequest {
            tenant_ids: self.selection.iter().cloned().collect(),
        }
    }
}
