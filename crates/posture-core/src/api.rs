//! Service port for the posture backend

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{
    AppsReport, AuditLog, CreateTenantRequest, DataReport, GuaranteeUpdate, IdentityReport,
    M365Credentials, ManualWidget, NewAuditEntry, SecureScoreEntry, Tenant, UserModel,
};
use crate::error::ServiceError;

/// One method per backend endpoint; each performs exactly one request.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PostureApi: Send + Sync {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ServiceError>;
    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant, ServiceError>;
    async fn connect_microsoft365(
        &self,
        tenant_id: &str,
        credentials: &M365Credentials,
    ) -> Result<Tenant, ServiceError>;
    async fn update_guarantees(
        &self,
        tenant_id: &str,
        update: &GuaranteeUpdate,
    ) -> Result<Tenant, ServiceError>;

    async fn list_widgets(&self, tenant_id: &str) -> Result<Vec<ManualWidget>, ServiceError>;
    async fn toggle_widget(
        &self,
        tenant_id: &str,
        widget_id: &str,
    ) -> Result<ManualWidget, ServiceError>;

    async fn score_history(&self, tenant_id: &str) -> Result<Vec<SecureScoreEntry>, ServiceError>;
    async fn secure_scores(&self, tenant_id: &str) -> Result<Vec<SecureScoreEntry>, ServiceError>;
    async fn user_secure_scores(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<SecureScoreEntry>, ServiceError>;
    async fn identity_report(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<IdentityReport, ServiceError>;
    async fn data_report(&self, user_id: &str, tenant_id: &str)
        -> Result<DataReport, ServiceError>;
    async fn apps_report(&self, user_id: &str, tenant_id: &str)
        -> Result<AppsReport, ServiceError>;

    async fn write_audit(&self, entry: &NewAuditEntry) -> Result<(), ServiceError>;
    async fn audit_logs(&self) -> Result<Vec<AuditLog>, ServiceError>;

    async fn list_users(&self) -> Result<Vec<UserModel>, ServiceError>;
    async fn save_tenant_access(
        &self,
        user_id: &str,
        tenant_ids: &BTreeSet<String>,
    ) -> Result<UserModel, ServiceError>;
}
