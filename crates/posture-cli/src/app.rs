use std::sync::Arc;

use posture_core::state::{Action, Resource, Store, TenantsAction};
use posture_core::{PostureApi, TenantAccessDraft};
use tokio::sync::mpsc;
use tracing::info;
use validator::Validate;

use crate::form::NewTenantForm;
use crate::sync::{AppEvent, Loader, Notice};

/// Screen states for the TUI state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Tenants,
    Overview,
    Identities,
    Devices,
    Cloud,
    Widgets,
    Access,
    AccessDialog, // Tenant selection for one user
    NewTenant,
    AuditLog,
}

impl Screen {
    /// Pages that show data of the selected tenant.
    pub fn is_tenant_page(&self) -> bool {
        matches!(
            self,
            Screen::Overview
                | Screen::Identities
                | Screen::Devices
                | Screen::Cloud
                | Screen::Widgets
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Tenants => "Tenants",
            Screen::Overview => "Overview",
            Screen::Identities => "Identities",
            Screen::Devices => "End-user devices",
            Screen::Cloud => "Cloud & apps",
            Screen::Widgets => "Manual widgets",
            Screen::Access => "Tenant access",
            Screen::AccessDialog => "Edit tenant access",
            Screen::NewTenant => "New tenant",
            Screen::AuditLog => "Audit log",
        }
    }

    /// Resources whose failure is reported on this screen.
    pub fn resources(&self) -> &'static [Resource] {
        match self {
            Screen::Tenants => &[Resource::Tenants],
            Screen::Overview => &[
                Resource::SecureScores,
                Resource::ScoreHistory,
                Resource::IdentityReport,
                Resource::DataReport,
                Resource::AppsReport,
            ],
            Screen::Identities => &[Resource::IdentityReport],
            Screen::Devices => &[Resource::DataReport],
            Screen::Cloud => &[Resource::AppsReport],
            Screen::Widgets => &[Resource::Widgets],
            Screen::Access | Screen::AccessDialog => &[Resource::Users, Resource::Tenants],
            Screen::NewTenant => &[],
            Screen::AuditLog => &[Resource::AuditLogs],
        }
    }
}

/// Application state
pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub store: Store,

    loader: Loader,
    events: mpsc::UnboundedReceiver<AppEvent>,

    // List cursors
    pub tenant_index: usize,
    pub widget_index: usize,
    pub user_index: usize,
    pub dialog_index: usize,
    pub audit_index: usize,

    pub access_draft: Option<TenantAccessDraft>,
    pub form: NewTenantForm,

    /// Popup shown over the current screen until a key is pressed.
    pub message: Option<Notice>,
}

impl App {
    pub fn new(api: Arc<dyn PostureApi>, user_id: Option<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            screen: Screen::Tenants,
            should_quit: false,
            store: Store::new(),
            loader: Loader::new(api, tx, user_id),
            events: rx,
            tenant_index: 0,
            widget_index: 0,
            user_index: 0,
            dialog_index: 0,
            audit_index: 0,
            access_draft: None,
            form: NewTenantForm::default(),
            message: None,
        }
    }

    pub fn selected_tenant_id(&self) -> Option<String> {
        self.store.tenants.selected.clone()
    }

    /// Enter `screen`: loads started for the previous screen are cancelled and
    /// the new screen's data is requested.
    pub fn open(&mut self, screen: Screen) {
        let screen = if screen.is_tenant_page() && self.selected_tenant_id().is_none() {
            Screen::Tenants
        } else {
            screen
        };

        self.loader.rescope();
        self.store.abandon_pending();
        self.screen = screen;
        self.load_current();
    }

    pub fn refresh(&mut self) {
        self.open(self.screen);
    }

    fn load_current(&mut self) {
        let tenant = self.selected_tenant_id();
        let store = &mut self.store;

        match (self.screen, tenant) {
            (Screen::Tenants, _) => self.loader.load_tenants(store),
            (Screen::Overview, Some(t)) => {
                self.loader.load_secure_scores(store, &t);
                self.loader.load_score_history(store, &t);
                self.loader.load_identity(store, &t);
                self.loader.load_data(store, &t);
                self.loader.load_apps(store, &t);
            }
            (Screen::Identities, Some(t)) => self.loader.load_identity(store, &t),
            (Screen::Devices, Some(t)) => self.loader.load_data(store, &t),
            (Screen::Cloud, Some(t)) => self.loader.load_apps(store, &t),
            (Screen::Widgets, Some(t)) => {
                self.widget_index = 0;
                self.loader.load_widgets(store, &t);
            }
            (Screen::Access, _) => {
                self.loader.load_users(store);
                self.loader.load_tenants(store);
            }
            (Screen::AuditLog, _) => {
                self.audit_index = 0;
                self.loader.load_audit_logs(store);
            }
            _ => {}
        }
    }

    /// Switch tenant: old tenant data is dropped before the overview loads.
    pub fn select_tenant(&mut self) {
        let Some(tenant) = self.store.tenants.tenants.get(self.tenant_index) else {
            return;
        };
        let id = tenant.id.clone();
        info!(tenant_id = %id, "tenant selected");

        self.store.dispatch(Action::Tenants(TenantsAction::Select(Some(id))));
        self.store.reset_tenant_data();
        self.open(Screen::Overview);
    }

    pub fn go_back(&mut self) {
        match self.screen {
            Screen::Tenants => self.quit(),
            Screen::AccessDialog => {
                self.access_draft = None;
                self.screen = Screen::Access;
            }
            s if s.is_tenant_page() => self.open(Screen::Tenants),
            _ => {
                let home = if self.selected_tenant_id().is_some() {
                    Screen::Overview
                } else {
                    Screen::Tenants
                };
                self.open(home);
            }
        }
    }

    pub fn quit(&mut self) {
        self.loader.shutdown();
        self.should_quit = true;
    }

    // Cursor helpers

    pub fn list_len(&self) -> usize {
        match self.screen {
            Screen::Tenants => self.store.tenants.tenants.len(),
            Screen::Widgets => self.store.tenants.widgets.len(),
            Screen::Access => self.store.access.users.len(),
            Screen::AccessDialog => self.store.tenants.tenants.len(),
            Screen::AuditLog => self.store.audit.entries.len(),
            _ => 0,
        }
    }

    fn cursor_mut(&mut self) -> Option<&mut usize> {
        match self.screen {
            Screen::Tenants => Some(&mut self.tenant_index),
            Screen::Widgets => Some(&mut self.widget_index),
            Screen::Access => Some(&mut self.user_index),
            Screen::AccessDialog => Some(&mut self.dialog_index),
            Screen::AuditLog => Some(&mut self.audit_index),
            _ => None,
        }
    }

    pub fn cursor_up(&mut self) {
        if let Some(index) = self.cursor_mut() {
            *index = index.saturating_sub(1);
        }
    }

    pub fn cursor_down(&mut self) {
        let len = self.list_len();
        if let Some(index) = self.cursor_mut() {
            if *index + 1 < len {
                *index += 1;
            }
        }
    }

    fn clamp_cursors(&mut self) {
        let clamp = |index: &mut usize, len: usize| *index = (*index).min(len.saturating_sub(1));
        clamp(&mut self.tenant_index, self.store.tenants.tenants.len());
        clamp(&mut self.widget_index, self.store.tenants.widgets.len());
        clamp(&mut self.user_index, self.store.access.users.len());
        clamp(&mut self.dialog_index, self.store.tenants.tenants.len());
        clamp(&mut self.audit_index, self.store.audit.entries.len());
    }

    // Actions

    pub fn toggle_selected_widget(&mut self) {
        let Some(tenant_id) = self.selected_tenant_id() else {
            return;
        };
        if let Some(widget) = self.store.tenants.widgets.get(self.widget_index) {
            self.loader.toggle_widget(&tenant_id, &widget.widget_id);
        }
    }

    pub fn open_access_dialog(&mut self) {
        if let Some(user) = self.store.access.users.get(self.user_index) {
            self.access_draft = Some(TenantAccessDraft::for_user(user));
            self.dialog_index = 0;
            self.screen = Screen::AccessDialog;
        }
    }

    pub fn toggle_dialog_tenant(&mut self) {
        let Some(tenant) = self.store.tenants.tenants.get(self.dialog_index) else {
            return;
        };
        if let Some(draft) = self.access_draft.as_mut() {
            draft.toggle(&tenant.id);
        }
    }

    pub fn save_access(&mut self) {
        let Some(draft) = self.access_draft.take() else {
            return;
        };
        self.screen = Screen::Access;
        if draft.is_dirty() {
            self.loader.save_access(draft);
        } else {
            self.message = Some(Notice::info("No changes to save"));
        }
    }

    pub fn open_new_tenant(&mut self) {
        self.form = NewTenantForm::default();
        self.open(Screen::NewTenant);
    }

    /// Validate locally so the form stays open on bad input.
    pub fn submit_new_tenant(&mut self) {
        let (request, credentials) = self.form.to_requests();

        let invalid = request
            .validate()
            .err()
            .or_else(|| credentials.validate().err());
        if let Some(errors) = invalid {
            self.message = Some(Notice::error(format!("Invalid input: {}", errors)));
            return;
        }

        self.loader.create_tenant(request, credentials);
        self.form = NewTenantForm::default();
        self.open(Screen::Tenants);
    }

    /// Apply everything the background tasks have reported so far.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
        }
    }

    /// Wait for the next background event and apply it.
    #[cfg(test)]
    pub async fn next_event(&mut self) {
        if let Some(event) = self.events.recv().await {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Completed(completion) => {
                self.store.complete(completion);
            }
            AppEvent::Applied { actions, notice } => {
                for action in actions {
                    self.store.dispatch(action);
                }
                if notice.is_some() {
                    self.message = notice;
                }
            }
        }
        self.clamp_cursors();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use posture_core::state::RequestStatus;
    use posture_core::{MockPostureApi, SecureScoreEntry, ServiceError, Tenant};

    fn tenant(id: &str) -> Tenant {
        Tenant {
            id: id.into(),
            name: id.to_uppercase(),
            domain: format!("{}.com", id),
            microsoft365: None,
            guarantees: Vec::new(),
        }
    }

    fn entry(percentage: f64) -> SecureScoreEntry {
        SecureScoreEntry {
            month: "Mar".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            percentage,
            comparative: None,
        }
    }

    #[tokio::test]
    async fn test_tenant_page_without_selection_falls_back_to_tenants() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| Ok(Vec::new()));
        let mut app = App::new(Arc::new(api), None);

        app.open(Screen::Identities);

        assert_eq!(app.screen, Screen::Tenants);
        assert!(app.store.is_loading(Resource::Tenants));
    }

    #[tokio::test]
    async fn test_select_tenant_loads_overview() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| Ok(vec![tenant("a"), tenant("b")]));
        api.expect_secure_scores()
            .withf(|t| t == "b")
            .returning(|_| Ok(vec![entry(72.0)]));
        api.expect_score_history().returning(|_| Ok(vec![entry(60.0), entry(72.0)]));
        let mut app = App::new(Arc::new(api), None);

        app.open(Screen::Tenants);
        app.next_event().await;
        app.cursor_down();
        app.select_tenant();

        assert_eq!(app.screen, Screen::Overview);
        assert_eq!(app.selected_tenant_id().as_deref(), Some("b"));

        for _ in 0..2 {
            app.next_event().await;
        }
        assert_eq!(app.store.scores.current().map(|e| e.percentage), Some(72.0));
        assert_eq!(app.store.scores.history.len(), 2);
        // No user configured: category reports fail fast instead of loading.
        assert!(app.store.error(Resource::IdentityReport).is_some());
    }

    #[tokio::test]
    async fn test_leaving_screen_abandons_its_loads() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| Ok(vec![tenant("a")]));
        api.expect_audit_logs().returning(|| Err(ServiceError::Timeout));
        let mut app = App::new(Arc::new(api), None);

        app.open(Screen::Tenants);
        app.open(Screen::AuditLog);

        assert_eq!(*app.store.status(Resource::Tenants), RequestStatus::Idle);
        app.next_event().await;
        app.drain_events();

        assert!(app.store.tenants.tenants.is_empty());
        assert_eq!(
            app.store.error(Resource::AuditLogs),
            Some("Could not reach the posture service")
        );
    }

    #[tokio::test]
    async fn test_invalid_new_tenant_keeps_form_open() {
        let mut app = App::new(Arc::new(MockPostureApi::new()), None);
        app.open_new_tenant();
        "x".chars().for_each(|c| app.form.push(c));

        app.submit_new_tenant();

        assert_eq!(app.screen, Screen::NewTenant);
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
        assert_eq!(app.form.name, "x");
    }

    #[tokio::test]
    async fn test_unchanged_access_draft_is_not_saved() {
        let mut api = MockPostureApi::new();
        api.expect_save_tenant_access().times(0);
        let mut app = App::new(Arc::new(api), None);
        app.store.dispatch(Action::Access(posture_core::state::AccessAction::SetUsers(vec![
            posture_core::UserModel {
                id: "u1".into(),
                email: "ada@contoso.com".into(),
                display_name: "Ada".into(),
                tenant_ids: Default::default(),
            },
        ])));
        app.screen = Screen::Access;

        app.open_access_dialog();
        assert_eq!(app.screen, Screen::AccessDialog);
        app.save_access();

        assert_eq!(app.screen, Screen::Access);
        assert_eq!(app.message, Some(Notice::info("No changes to save")));
    }

    #[tokio::test]
    async fn test_toggle_landing_after_tenant_switch_is_dropped() {
        let mut api = MockPostureApi::new();
        api.expect_toggle_widget()
            .withf(|tenant, widget| tenant == "a" && widget == "wa")
            .times(1)
            .returning(|_, widget| {
                Ok(posture_core::ManualWidget {
                    widget_id: widget.to_string(),
                    title: "Backups verified".into(),
                    enabled: true,
                    updated_at: None,
                    updated_by: None,
                })
            });
        api.expect_write_audit().returning(|_| Ok(()));
        api.expect_secure_scores().returning(|_| Ok(Vec::new()));
        api.expect_score_history().returning(|_| Ok(Vec::new()));
        let mut app = App::new(Arc::new(api), None);

        app.store.dispatch(Action::Tenants(TenantsAction::SetTenants(vec![
            tenant("a"),
            tenant("b"),
        ])));
        app.store.dispatch(Action::Tenants(TenantsAction::Select(Some("a".into()))));
        app.store.dispatch(Action::Tenants(TenantsAction::SetWidgets(vec![
            posture_core::ManualWidget {
                widget_id: "wa".into(),
                title: "Backups verified".into(),
                enabled: false,
                updated_at: None,
                updated_by: None,
            },
        ])));
        app.screen = Screen::Widgets;

        app.toggle_selected_widget();
        app.tenant_index = 1;
        app.select_tenant();

        // Toggle result plus the two overview loads
        for _ in 0..3 {
            app.next_event().await;
        }

        assert_eq!(app.selected_tenant_id().as_deref(), Some("b"));
        assert!(app.store.tenants.widgets.is_empty());
    }
}
