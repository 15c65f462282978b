//! HTTP implementation of [`PostureApi`] over the dashboard's REST backend.
//!
//! One request per call, no retries. Failures are logged here once and returned
//! as [`ServiceError`]; nothing is swallowed.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;
use validator::Validate;

use posture_core::{
    AppsReport, AuditLog, CreateTenantRequest, DataReport, GuaranteeUpdate, IdentityReport,
    M365Credentials, ManualWidget, NewAuditEntry, PostureApi, SecureScoreEntry, ServiceError,
    Tenant, TenantAccessRequest, UserModel,
};
use posture_shared::config::ApiSettings;
use posture_shared::constants::REQUEST_ID_HEADER;

const MAX_ERROR_BODY: usize = 200;

pub struct PostureClient {
    http: Client,
    base_url: Url,
}

impl PostureClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ServiceError> {
        let mut base_url =
            Url::parse(&settings.base_url).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(settings.base_url.clone()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        // Cookie credentials are always sent, like `credentials: 'include'`
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &settings.session_cookie {
            jar.add_cookie_str(cookie, &base_url);
        }

        let http = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!("posture/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join percent-encoded path segments onto the base URL. Empty, `.` and `..`
    /// segments are rejected since URL normalization would drop or resolve them.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            error!(segment = %bad, "refusing path segment");
            return Err(ServiceError::InvalidUrl(segments.join("/")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ServiceError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    /// Send and check the status; the body is left for the caller.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, ServiceError> {
        let request_id = Uuid::new_v4().to_string();
        debug!(operation, request_id = %request_id, "sending request");

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                error!(operation, request_id = %request_id, error = %e, "request failed");
                transport_error(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            operation,
            request_id = %request_id,
            status = status.as_u16(),
            "backend returned an error status"
        );

        if status == StatusCode::UNAUTHORIZED {
            return Err(ServiceError::Unauthorized);
        }
        Err(ServiceError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = self.send(operation, request).await?;
        let bytes = response.bytes().await.map_err(|e| {
            error!(operation, error = %e, "failed to read response body");
            transport_error(e)
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!(operation, error = %e, "failed to decode response");
            ServiceError::Decode(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        segments: &[&str],
    ) -> Result<T, ServiceError> {
        self.fetch(operation, self.request(Method::GET, segments)?).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ServiceError> {
        let request = self.request(method, segments)?.json(body);
        self.fetch(operation, request).await
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Transport(e.to_string())
    }
}

/// Prefer the backend's `message`/`error` field, fall back to a trimmed body or the reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("Unknown error").to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

fn check_entries(operation: &str, entries: &[SecureScoreEntry]) -> Result<(), ServiceError> {
    for (index, entry) in entries.iter().enumerate() {
        entry.validate().map_err(|e| {
            error!(operation, index, error = %e, "score entry failed validation");
            ServiceError::InvalidPayload(format!("entry {}: {}", index, e))
        })?;
    }
    Ok(())
}

fn check_score<T: Validate>(operation: &str, score: &T) -> Result<(), ServiceError> {
    score.validate().map_err(|e| {
        error!(operation, error = %e, "category score failed validation");
        ServiceError::InvalidPayload(e.to_string())
    })
}

#[async_trait]
impl PostureApi for PostureClient {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, ServiceError> {
        self.get("list_tenants", &["api", "tenants"]).await
    }

    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant, ServiceError> {
        request.validate()?;
        self.send_json("create_tenant", Method::POST, &["api", "tenants"], request)
            .await
    }

    async fn connect_microsoft365(
        &self,
        tenant_id: &str,
        credentials: &M365Credentials,
    ) -> Result<Tenant, ServiceError> {
        credentials.validate()?;
        self.send_json(
            "connect_microsoft365",
            Method::POST,
            &["api", "tenants", tenant_id, "microsoft365"],
            credentials,
        )
        .await
    }

    async fn update_guarantees(
        &self,
        tenant_id: &str,
        update: &GuaranteeUpdate,
    ) -> Result<Tenant, ServiceError> {
        self.send_json(
            "update_guarantees",
            Method::PATCH,
            &["api", "tenants", tenant_id, "guarantees"],
            update,
        )
        .await
    }

    async fn list_widgets(&self, tenant_id: &str) -> Result<Vec<ManualWidget>, ServiceError> {
        self.get("list_widgets", &["api", "tenants", tenant_id, "widgets"])
            .await
    }

    async fn toggle_widget(
        &self,
        tenant_id: &str,
        widget_id: &str,
    ) -> Result<ManualWidget, ServiceError> {
        let request = self.request(
            Method::POST,
            &["api", "tenants", tenant_id, "widgets", widget_id, "toggle"],
        )?;
        self.fetch("toggle_widget", request).await
    }

    async fn score_history(&self, tenant_id: &str) -> Result<Vec<SecureScoreEntry>, ServiceError> {
        let entries: Vec<SecureScoreEntry> = self
            .get("score_history", &["api", "score-history", tenant_id])
            .await?;
        check_entries("score_history", &entries)?;
        Ok(entries)
    }

    async fn secure_scores(&self, tenant_id: &str) -> Result<Vec<SecureScoreEntry>, ServiceError> {
        let entries: Vec<SecureScoreEntry> = self
            .get("secure_scores", &["api", "secure-scores", tenant_id])
            .await?;
        check_entries("secure_scores", &entries)?;
        Ok(entries)
    }

    async fn user_secure_scores(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<SecureScoreEntry>, ServiceError> {
        let entries: Vec<SecureScoreEntry> = self
            .get("user_secure_scores", &["api", "secure-scores", user_id, tenant_id])
            .await?;
        check_entries("user_secure_scores", &entries)?;
        Ok(entries)
    }

    async fn identity_report(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<IdentityReport, ServiceError> {
        let report: IdentityReport = self
            .get("identity_report", &["api", "secure-scores", "identity", user_id, tenant_id])
            .await?;
        check_score("identity_report", &report.score)?;
        Ok(report)
    }

    async fn data_report(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<DataReport, ServiceError> {
        let report: DataReport = self
            .get("data_report", &["api", "secure-scores", "data", user_id, tenant_id])
            .await?;
        check_score("data_report", &report.score)?;
        Ok(report)
    }

    async fn apps_report(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<AppsReport, ServiceError> {
        let report: AppsReport = self
            .get("apps_report", &["api", "secure-scores", "apps", user_id, tenant_id])
            .await?;
        check_score("apps_report", &report.score)?;
        Ok(report)
    }

    async fn write_audit(&self, entry: &NewAuditEntry) -> Result<(), ServiceError> {
        let request = self.request(Method::POST, &["api", "audit"])?.json(entry);
        self.send("write_audit", request).await?;
        Ok(())
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLog>, ServiceError> {
        self.get("audit_logs", &["api", "audit-logs"]).await
    }

    async fn list_users(&self) -> Result<Vec<UserModel>, ServiceError> {
        self.get("list_users", &["api", "users"]).await
    }

    async fn save_tenant_access(
        &self,
        user_id: &str,
        tenant_ids: &BTreeSet<String>,
    ) -> Result<UserModel, ServiceError> {
        let body = TenantAccessRequest {
            tenant_ids: tenant_ids.iter().cloned().collect(),
        };
        self.send_json(
            "save_tenant_access",
            Method::PUT,
            &["api", "users", user_id, "tenants"],
            &body,
        )
        .await
    }
}
