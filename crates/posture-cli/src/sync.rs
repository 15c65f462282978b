//! Data loading for the TUI.
//!
//! Every load started for a screen shares that screen's cancellation scope, so
//! leaving the screen (or switching tenant) stops it from dispatching. Completions
//! travel back over a channel and are applied by the UI loop, the only writer of
//! the store.

use std::future::Future;
use std::sync::Arc;

use posture_core::state::{
    AccessAction, Action, AuditLogAction, CloudAction, Completion, DevicesAction,
    IdentitiesAction, Resource, ScoresAction, Store, TenantsAction,
};
use posture_core::{
    AuditAction, CreateTenantRequest, M365Credentials, NewAuditEntry, PostureApi, ScoreCategory,
    ServiceError, TenantAccessDraft,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const MISSING_USER: &str = "No dashboard user configured (set POSTURE_API__USER_ID or --user)";

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: true }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    /// A scoped load finished.
    Completed(Completion),
    /// A user-triggered change finished; its actions bypass generation checks.
    Applied { actions: Vec<Action>, notice: Option<Notice> },
}

pub struct Loader {
    api: Arc<dyn PostureApi>,
    events: mpsc::UnboundedSender<AppEvent>,
    scope: CancellationToken,
    user_id: Option<String>,
}

impl Loader {
    pub fn new(
        api: Arc<dyn PostureApi>,
        events: mpsc::UnboundedSender<AppEvent>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            api,
            events,
            scope: CancellationToken::new(),
            user_id,
        }
    }

    /// Cancel everything started under the current scope and open a new one.
    pub fn rescope(&mut self) {
        self.scope.cancel();
        self.scope = CancellationToken::new();
    }

    pub fn shutdown(&self) {
        self.scope.cancel();
    }

    fn spawn_load<F, Fut>(&self, store: &mut Store, resource: Resource, fetch: F)
    where
        F: FnOnce(Arc<dyn PostureApi>) -> Fut,
        Fut: Future<Output = Result<Vec<Action>, ServiceError>> + Send + 'static,
    {
        let generation = store.begin(resource);
        let token = self.scope.clone();
        let events = self.events.clone();
        let request = fetch(Arc::clone(&self.api));

        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(resource = resource.label(), generation, "load cancelled");
                    return;
                }
                outcome = request => outcome,
            };

            let completion = match outcome {
                Ok(actions) => Completion::success(resource, generation, actions),
                Err(e) => Completion::failure(resource, generation, e.user_message()),
            };
            let _ = events.send(AppEvent::Completed(completion));
        });
    }

    /// Per-user endpoints need a user id; without one the resource fails immediately.
    fn require_user(&self, store: &mut Store, resource: Resource) -> Option<String> {
        if self.user_id.is_none() {
            let generation = store.begin(resource);
            store.complete(Completion::failure(resource, generation, MISSING_USER));
        }
        self.user_id.clone()
    }

    pub fn load_tenants(&self, store: &mut Store) {
        self.spawn_load(store, Resource::Tenants, |api| async move {
            let tenants = api.list_tenants().await?;
            Ok(vec![Action::Tenants(TenantsAction::SetTenants(tenants))])
        });
    }

    pub fn load_widgets(&self, store: &mut Store, tenant_id: &str) {
        let tenant_id = tenant_id.to_string();
        self.spawn_load(store, Resource::Widgets, |api| async move {
            let widgets = api.list_widgets(&tenant_id).await?;
            Ok(vec![Action::Tenants(TenantsAction::SetWidgets(widgets))])
        });
    }

    /// Current score series, preferring the per-user signature when a user is configured.
    pub fn load_secure_scores(&self, store: &mut Store, tenant_id: &str) {
        let tenant_id = tenant_id.to_string();
        let user_id = self.user_id.clone();
        self.spawn_load(store, Resource::SecureScores, |api| async move {
            let scores = match user_id {
                Some(user_id) => api.user_secure_scores(&user_id, &tenant_id).await?,
                None => api.secure_scores(&tenant_id).await?,
            };
            Ok(vec![Action::Scores(ScoresAction::SetSecureScores(scores))])
        });
    }

    pub fn load_score_history(&self, store: &mut Store, tenant_id: &str) {
        let tenant_id = tenant_id.to_string();
        self.spawn_load(store, Resource::ScoreHistory, |api| async move {
            let history = api.score_history(&tenant_id).await?;
            Ok(vec![Action::Scores(ScoresAction::SetHistory(history))])
        });
    }

    pub fn load_identity(&self, store: &mut Store, tenant_id: &str) {
        let Some(user_id) = self.require_user(store, Resource::IdentityReport) else {
            return;
        };
        let tenant_id = tenant_id.to_string();
        self.spawn_load(store, Resource::IdentityReport, |api| async move {
            let report = api.identity_report(&user_id, &tenant_id).await?;
            Ok(vec![
                Action::Scores(ScoresAction::SetCategoryScore(
                    ScoreCategory::Identity,
                    report.score,
                )),
                Action::Identities(IdentitiesAction::SetMfa(report.mfa)),
                Action::Identities(IdentitiesAction::SetPeople(report.people)),
                Action::Identities(IdentitiesAction::SetCommentary(report.commentary)),
            ])
        });
    }

    pub fn load_data(&self, store: &mut Store, tenant_id: &str) {
        let Some(user_id) = self.require_user(store, Resource::DataReport) else {
            return;
        };
        let tenant_id = tenant_id.to_string();
        self.spawn_load(store, Resource::DataReport, |api| async move {
            let report = api.data_report(&user_id, &tenant_id).await?;
            Ok(vec![
                Action::Scores(ScoresAction::SetCategoryScore(ScoreCategory::Data, report.score)),
                Action::Devices(DevicesAction::SetUnencryptedDevices(report.unencrypted_devices)),
                Action::Devices(DevicesAction::SetCommentary(report.commentary)),
            ])
        });
    }

    pub fn load_apps(&self, store: &mut Store, tenant_id: &str) {
        let Some(user_id) = self.require_user(store, Resource::AppsReport) else {
            return;
        };
        let tenant_id = tenant_id.to_string();
        self.spawn_load(store, Resource::AppsReport, |api| async move {
            let report = api.apps_report(&user_id, &tenant_id).await?;
            Ok(vec![
                Action::Scores(ScoresAction::SetCategoryScore(ScoreCategory::Apps, report.score)),
                Action::Cloud(CloudAction::SetFindings(report.findings)),
                Action::Cloud(CloudAction::SetCommentary(report.commentary)),
            ])
        });
    }

    pub fn load_audit_logs(&self, store: &mut Store) {
        self.spawn_load(store, Resource::AuditLogs, |api| async move {
            let entries = api.audit_logs().await?;
            Ok(vec![Action::Audit(AuditLogAction::SetEntries(entries))])
        });
    }

    pub fn load_users(&self, store: &mut Store) {
        self.spawn_load(store, Resource::Users, |api| async move {
            let users = api.list_users().await?;
            Ok(vec![Action::Access(AccessAction::SetUsers(users))])
        });
    }

    // Mutations are not scoped: once the user confirms, they run to completion.

    pub fn toggle_widget(&self, tenant_id: &str, widget_id: &str) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let tenant_id = tenant_id.to_string();
        let widget_id = widget_id.to_string();

        tokio::spawn(async move {
            let event = match api.toggle_widget(&tenant_id, &widget_id).await {
                Ok(widget) => {
                    let state = if widget.enabled { "enabled" } else { "disabled" };
                    let entry = NewAuditEntry::new(AuditAction::WidgetToggled)
                        .tenant(tenant_id.clone())
                        .target(widget_id)
                        .detail(state);
                    let notice = audit(api.as_ref(), &entry).await;
                    AppEvent::Applied {
                        actions: vec![Action::Tenants(TenantsAction::UpsertWidget {
                            tenant_id,
                            widget,
                        })],
                        notice,
                    }
                }
                Err(e) => AppEvent::Applied {
                    actions: Vec::new(),
                    notice: Some(Notice::error(format!("Toggle failed: {}", e.user_message()))),
                },
            };
            let _ = events.send(event);
        });
    }

    pub fn save_access(&self, draft: TenantAccessDraft) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = match api.save_tenant_access(&draft.user_id, draft.selection()).await {
                Ok(user) => {
                    let tenants: Vec<&str> = draft.selection().iter().map(String::as_str).collect();
                    let entry = NewAuditEntry::new(AuditAction::TenantAccessUpdated)
                        .target(draft.user_id.clone())
                        .detail(tenants.join(","));
                    let notice = audit(api.as_ref(), &entry).await.or_else(|| {
                        Some(Notice::info(format!("Access saved for {}", user.display_name)))
                    });
                    AppEvent::Applied {
                        actions: vec![Action::Access(AccessAction::UpsertUser(user))],
                        notice,
                    }
                }
                Err(e) => AppEvent::Applied {
                    actions: Vec::new(),
                    notice: Some(Notice::error(format!(
                        "Saving access failed: {}",
                        e.user_message()
                    ))),
                },
            };
            let _ = events.send(event);
        });
    }

    /// Create the tenant, connect it to Microsoft 365, then refresh the tenant list.
    pub fn create_tenant(&self, request: CreateTenantRequest, credentials: M365Credentials) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = match onboard_tenant(api.as_ref(), &request, &credentials).await {
                Ok((actions, notice)) => AppEvent::Applied { actions, notice: Some(notice) },
                Err(e) => AppEvent::Applied {
                    actions: Vec::new(),
                    notice: Some(Notice::error(format!(
                        "Creating tenant failed: {}",
                        e.user_message()
                    ))),
                },
            };
            let _ = events.send(event);
        });
    }
}

async fn onboard_tenant(
    api: &dyn PostureApi,
    request: &CreateTenantRequest,
    credentials: &M365Credentials,
) -> Result<(Vec<Action>, Notice), ServiceError> {
    let tenant = api.create_tenant(request).await?;
    let created = NewAuditEntry::new(AuditAction::TenantCreated)
        .tenant(tenant.id.clone())
        .detail(tenant.domain.clone());
    let mut notice = audit(api, &created).await;

    let connected = match api.connect_microsoft365(&tenant.id, credentials).await {
        Ok(tenant) => {
            let entry =
                NewAuditEntry::new(AuditAction::Microsoft365Connected).tenant(tenant.id.clone());
            notice = notice.or(audit(api, &entry).await);
            tenant.is_connected()
        }
        Err(e) => {
            notice = Some(Notice::error(format!(
                "Tenant {} created, but connecting Microsoft 365 failed: {}",
                tenant.name,
                e.user_message()
            )));
            false
        }
    };

    // The tenant exists at this point; a failed refresh must not read as a failed create.
    let actions = match api.list_tenants().await {
        Ok(tenants) => vec![Action::Tenants(TenantsAction::SetTenants(tenants))],
        Err(e) => {
            warn!(tenant_id = %tenant.id, error = %e, "tenant list refresh failed");
            notice = notice.or_else(|| {
                Some(Notice::error(format!(
                    "Tenant {} created, but refreshing the tenant list failed: {} (r to retry)",
                    tenant.name,
                    e.user_message()
                )))
            });
            Vec::new()
        }
    };

    let notice = notice.unwrap_or_else(|| {
        if connected {
            Notice::info(format!("Tenant {} created and connected", tenant.name))
        } else {
            Notice::info(format!(
                "Tenant {} created; Microsoft 365 connection pending",
                tenant.name
            ))
        }
    });

    Ok((actions, notice))
}

/// Write an audit entry; a failure becomes a notice instead of undoing the change.
async fn audit(api: &dyn PostureApi, entry: &NewAuditEntry) -> Option<Notice> {
    match api.write_audit(entry).await {
        Ok(()) => None,
        Err(e) => {
            warn!(action = entry.action.as_str(), error = %e, "audit entry not recorded");
            Some(Notice::error(format!(
                "Change saved, but the audit entry failed: {}",
                e.user_message()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_core::state::RequestStatus;
    use posture_core::{MockPostureApi, Tenant};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tenant(id: &str) -> Tenant {
        Tenant {
            id: id.into(),
            name: id.to_uppercase(),
            domain: format!("{}.com", id),
            microsoft365: None,
            guarantees: Vec::new(),
        }
    }

    fn loader(
        api: MockPostureApi,
        user: Option<&str>,
    ) -> (Loader, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Loader::new(Arc::new(api), tx, user.map(str::to_string)), rx)
    }

    fn apply(store: &mut Store, event: AppEvent) {
        match event {
            AppEvent::Completed(completion) => {
                store.complete(completion);
            }
            AppEvent::Applied { actions, .. } => {
                actions.into_iter().for_each(|a| store.dispatch(a))
            }
        }
    }

    #[tokio::test]
    async fn test_load_dispatches_into_store() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants()
            .times(1)
            .returning(|| Ok(vec![tenant("a"), tenant("b")]));
        let (loader, mut rx) = loader(api, None);
        let mut store = Store::new();

        loader.load_tenants(&mut store);
        assert!(store.is_loading(Resource::Tenants));

        let event = rx.recv().await.unwrap();
        apply(&mut store, event);
        assert_eq!(store.tenants.tenants.len(), 2);
        assert_eq!(*store.status(Resource::Tenants), RequestStatus::Loaded);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_not_raised() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| {
            Err(ServiceError::Status { status: 500, message: "boom".into() })
        });
        let (loader, mut rx) = loader(api, None);
        let mut store = Store::new();

        loader.load_tenants(&mut store);
        apply(&mut store, rx.recv().await.unwrap());

        assert_eq!(store.error(Resource::Tenants), Some("Failed to load (HTTP 500)"));
        assert!(store.tenants.tenants.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_scope_never_dispatches() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| Ok(vec![tenant("a")]));
        let (mut loader, mut rx) = loader(api, None);
        let mut store = Store::new();

        loader.load_tenants(&mut store);
        loader.rescope();
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_repeated_loads_keep_latest() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().times(2).returning(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![tenant(if n == 0 { "first" } else { "second" })])
        });
        let (loader, mut rx) = loader(api, None);
        let mut store = Store::new();

        loader.load_tenants(&mut store);
        loader.load_tenants(&mut store);
        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            apply(&mut store, event);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.tenants.tenants[0].id, "second");
    }

    #[tokio::test]
    async fn test_user_scoped_report_without_user_fails_fast() {
        let (loader, mut rx) = loader(MockPostureApi::new(), None);
        let mut store = Store::new();

        loader.load_identity(&mut store, "t1");

        assert_eq!(store.error(Resource::IdentityReport), Some(MISSING_USER));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_secure_scores_prefers_user_signature() {
        let mut api = MockPostureApi::new();
        api.expect_user_secure_scores()
            .withf(|user, tenant| user == "u1" && tenant == "t1")
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        api.expect_secure_scores().times(0);
        let (loader, mut rx) = loader(api, Some("u1"));
        let mut store = Store::new();

        loader.load_secure_scores(&mut store, "t1");
        apply(&mut store, rx.recv().await.unwrap());
        assert_eq!(*store.status(Resource::SecureScores), RequestStatus::Loaded);
    }

    #[tokio::test]
    async fn test_audit_failure_surfaces_as_notice() {
        let mut api = MockPostureApi::new();
        api.expect_toggle_widget().returning(|_, widget| {
            Ok(posture_core::ManualWidget {
                widget_id: widget.to_string(),
                title: "Backups verified".into(),
                enabled: true,
                updated_at: None,
                updated_by: None,
            })
        });
        api.expect_write_audit()
            .withf(|entry| entry.action == AuditAction::WidgetToggled)
            .returning(|_| Err(ServiceError::Timeout));
        let (loader, mut rx) = loader(api, None);

        loader.toggle_widget("t1", "backups");

        match rx.recv().await.unwrap() {
            AppEvent::Applied { actions, notice } => {
                assert_eq!(actions.len(), 1);
                assert!(notice.unwrap().is_error);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    /// Create, connect and both audit writes succeed; the tenant list refresh is configurable.
    fn onboarding_api(
        refresh: impl Fn() -> Result<Vec<Tenant>, ServiceError> + Send + 'static,
    ) -> MockPostureApi {
        let mut api = MockPostureApi::new();
        api.expect_create_tenant().times(1).returning(|req| {
            Ok(Tenant {
                id: "t9".into(),
                name: req.name.clone(),
                domain: req.domain.clone(),
                microsoft365: None,
                guarantees: Vec::new(),
            })
        });
        api.expect_connect_microsoft365()
            .withf(|id, creds| id == "t9" && creds.client_id == "app-1")
            .times(1)
            .returning(|id, creds| {
                Ok(Tenant {
                    id: id.to_string(),
                    name: "Contoso".into(),
                    domain: "contoso.com".into(),
                    microsoft365: Some(posture_core::Microsoft365Connection {
                        client_id: creds.client_id.clone(),
                        connected: true,
                    }),
                    guarantees: Vec::new(),
                })
            });
        api.expect_write_audit().times(2).returning(|_| Ok(()));
        api.expect_list_tenants().times(1).returning(refresh);
        api
    }

    fn contoso() -> (CreateTenantRequest, M365Credentials) {
        (
            CreateTenantRequest::new("Contoso", "contoso.com"),
            M365Credentials {
                client_id: "app-1".into(),
                client_secret: "s".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_onboarding_creates_connects_and_refreshes() {
        let api = onboarding_api(|| Ok(vec![tenant("t9")]));
        let (request, credentials) = contoso();

        let (actions, notice) = onboard_tenant(&api, &request, &credentials).await.unwrap();

        assert!(!notice.is_error);
        assert_eq!(notice.message, "Tenant Contoso created and connected");
        assert_eq!(actions.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_after_onboarding_still_reports_creation() {
        let api = onboarding_api(|| Err(ServiceError::Timeout));
        let (request, credentials) = contoso();

        let (actions, notice) = onboard_tenant(&api, &request, &credentials).await.unwrap();

        assert!(actions.is_empty());
        assert!(notice.is_error);
        assert!(notice.message.starts_with("Tenant Contoso created, but refreshing"));
        assert!(!notice.message.contains("Creating tenant failed"));
    }

    #[tokio::test]
    async fn test_failed_refresh_reaches_ui_as_warning() {
        let (loader, mut rx) = loader(onboarding_api(|| Err(ServiceError::Timeout)), None);
        let (request, credentials) = contoso();

        loader.create_tenant(request, credentials);

        match rx.recv().await.unwrap() {
            AppEvent::Applied { actions, notice } => {
                assert!(actions.is_empty());
                let notice = notice.unwrap();
                assert!(notice.message.contains("created"));
                assert!(!notice.message.starts_with("Creating tenant failed"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
