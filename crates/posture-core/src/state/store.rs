use std::collections::BTreeMap;

use tracing::debug;

use super::{
    AccessAction, AccessSlice, AuditLogAction, AuditSlice, CloudAction, CloudSlice, DevicesAction,
    DevicesSlice, IdentitiesAction, IdentitiesSlice, ScoresAction, ScoresSlice, Slice,
    TenantsAction, TenantsSlice,
};

/// Backend data a view can be waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Tenants,
    Widgets,
    SecureScores,
    ScoreHistory,
    IdentityReport,
    DataReport,
    AppsReport,
    AuditLogs,
    Users,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Tenants => "tenants",
            Resource::Widgets => "manual widgets",
            Resource::SecureScores => "secure scores",
            Resource::ScoreHistory => "score history",
            Resource::IdentityReport => "identity report",
            Resource::DataReport => "data report",
            Resource::AppsReport => "apps report",
            Resource::AuditLogs => "audit logs",
            Resource::Users => "users",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

static IDLE: RequestStatus = RequestStatus::Idle;

/// Everything that can be dispatched into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Scores(ScoresAction),
    Identities(IdentitiesAction),
    Devices(DevicesAction),
    Cloud(CloudAction),
    Tenants(TenantsAction),
    Audit(AuditLogAction),
    Access(AccessAction),
}

/// Result of one request, tagged with the generation handed out by [`Store::begin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub resource: Resource,
    pub generation: u64,
    pub outcome: Result<Vec<Action>, String>,
}

impl Completion {
    pub fn success(resource: Resource, generation: u64, actions: Vec<Action>) -> Self {
        Self {
            resource,
            generation,
            outcome: Ok(actions),
        }
    }

    pub fn failure(resource: Resource, generation: u64, message: impl Into<String>) -> Self {
        Self {
            resource,
            generation,
            outcome: Err(message.into()),
        }
    }
}

/// Single owner of client state. Mutated only through [`Store::dispatch`] and
/// [`Store::complete`], so callers must serialise access (the UI loop does).
#[derive(Debug, Default)]
pub struct Store {
    pub scores: ScoresSlice,
    pub identities: IdentitiesSlice,
    pub devices: DevicesSlice,
    pub cloud: CloudSlice,
    pub tenants: TenantsSlice,
    pub audit: AuditSlice,
    pub access: AccessSlice,

    status: BTreeMap<Resource, RequestStatus>,
    latest: BTreeMap<Resource, u64>,
    next_generation: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Scores(a) => self.scores.reduce(a),
            Action::Identities(a) => self.identities.reduce(a),
            Action::Devices(a) => self.devices.reduce(a),
            Action::Cloud(a) => self.cloud.reduce(a),
            Action::Tenants(a) => self.tenants.reduce(a),
            Action::Audit(a) => self.audit.reduce(a),
            Action::Access(a) => self.access.reduce(a),
        }
    }

    /// Mark `resource` as loading and return the generation its completion must carry.
    pub fn begin(&mut self, resource: Resource) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest.insert(resource, generation);
        self.status.insert(resource, RequestStatus::Loading);
        generation
    }

    /// Apply a completion unless a newer request for the same resource was started.
    /// Returns whether it was applied.
    pub fn complete(&mut self, completion: Completion) -> bool {
        let Completion { resource, generation, outcome } = completion;

        if self.latest.get(&resource) != Some(&generation) {
            debug!(resource = resource.label(), generation, "dropping stale completion");
            return false;
        }

        match outcome {
            Ok(actions) => {
                for action in actions {
                    self.dispatch(action);
                }
                self.status.insert(resource, RequestStatus::Loaded);
            }
            Err(message) => {
                self.status.insert(resource, RequestStatus::Failed(message));
            }
        }
        true
    }

    /// Forget in-flight requests; their completions will be dropped.
    pub fn abandon_pending(&mut self) {
        let pending: Vec<Resource> = self
            .status
            .iter()
            .filter(|(_, status)| **status == RequestStatus::Loading)
            .map(|(resource, _)| *resource)
            .collect();

        for resource in pending {
            self.next_generation += 1;
            self.latest.insert(resource, self.next_generation);
            self.status.insert(resource, RequestStatus::Idle);
        }
    }

    pub fn status(&self, resource: Resource) -> &RequestStatus {
        self.status.get(&resource).unwrap_or(&IDLE)
    }

    pub fn is_loading(&self, resource: Resource) -> bool {
        *self.status(resource) == RequestStatus::Loading
    }

    pub fn error(&self, resource: Resource) -> Option<&str> {
        match self.status(resource) {
            RequestStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// First failure among `resources`, for the page-level error panel.
    pub fn first_error(&self, resources: &[Resource]) -> Option<(Resource, &str)> {
        resources
            .iter()
            .find_map(|r| self.error(*r).map(|message| (*r, message)))
    }

    /// Data slices back to their initial values. Tenant list and selection survive.
    pub fn reset_tenant_data(&mut self) {
        self.scores.reduce(ScoresAction::Reset);
        self.identities.reduce(IdentitiesAction::Reset);
        self.devices.reduce(DevicesAction::Reset);
        self.cloud.reduce(CloudAction::Reset);
    }

    pub fn reset_all(&mut self) {
        self.reset_tenant_data();
        self.tenants.reduce(TenantsAction::Reset);
        self.audit.reduce(AuditLogAction::Reset);
        self.access.reduce(AccessAction::Reset);
        self.status.clear();
        self.abandon_all();
    }

    fn abandon_all(&mut self) {
        let resources: Vec<Resource> = self.latest.keys().copied().collect();
        for resource in resources {
            self.next_generation += 1;
            self.latest.insert(resource, self.next_generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SecureScoreEntry, Tenant};
    use chrono::NaiveDate;

    fn scores(percentage: f64) -> Action {
        Action::Scores(ScoresAction::SetSecureScores(vec![SecureScoreEntry {
            month: "Jan".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            percentage,
            comparative: None,
        }]))
    }

    fn current(store: &Store) -> Option<f64> {
        store.scores.current().map(|e| e.percentage)
    }

    #[test]
    fn test_completion_sets_loaded() {
        let mut store = Store::new();
        let generation = store.begin(Resource::SecureScores);
        assert!(store.is_loading(Resource::SecureScores));

        assert!(store.complete(Completion::success(
            Resource::SecureScores,
            generation,
            vec![scores(55.0)]
        )));
        assert_eq!(*store.status(Resource::SecureScores), RequestStatus::Loaded);
        assert_eq!(current(&store), Some(55.0));
    }

    #[test]
    fn test_latest_request_wins_regardless_of_arrival_order() {
        let mut store = Store::new();
        let first = store.begin(Resource::SecureScores);
        let second = store.begin(Resource::SecureScores);

        assert!(store.complete(Completion::success(
            Resource::SecureScores,
            second,
            vec![scores(80.0)]
        )));
        assert!(!store.complete(Completion::success(
            Resource::SecureScores,
            first,
            vec![scores(20.0)]
        )));

        assert_eq!(current(&store), Some(80.0));
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut store = Store::new();
        let generation = store.begin(Resource::SecureScores);
        store.complete(Completion::success(Resource::SecureScores, generation, vec![scores(61.0)]));

        let generation = store.begin(Resource::SecureScores);
        store.complete(Completion::failure(Resource::SecureScores, generation, "HTTP 500"));

        assert_eq!(store.error(Resource::SecureScores), Some("HTTP 500"));
        assert_eq!(current(&store), Some(61.0));
        assert_eq!(
            store.first_error(&[Resource::ScoreHistory, Resource::SecureScores]),
            Some((Resource::SecureScores, "HTTP 500"))
        );
    }

    #[test]
    fn test_abandoned_requests_are_dropped() {
        let mut store = Store::new();
        let generation = store.begin(Resource::Tenants);
        store.abandon_pending();

        assert_eq!(*store.status(Resource::Tenants), RequestStatus::Idle);
        let tenants = vec![Tenant {
            id: "t1".into(),
            name: "Contoso".into(),
            domain: "contoso.com".into(),
            microsoft365: None,
            guarantees: Vec::new(),
        }];
        assert!(!store.complete(Completion::success(
            Resource::Tenants,
            generation,
            vec![Action::Tenants(TenantsAction::SetTenants(tenants))],
        )));
        assert!(store.tenants.tenants.is_empty());
    }

    #[test]
    fn test_completion_for_unrequested_resource_is_dropped() {
        let mut store = Store::new();
        assert!(!store.complete(Completion::success(Resource::AuditLogs, 1, Vec::new())));
        assert_eq!(*store.status(Resource::AuditLogs), RequestStatus::Idle);
    }

    #[test]
    fn test_reset_all_restores_initial_state() {
        let mut store = Store::new();
        let generation = store.begin(Resource::SecureScores);
        store.complete(Completion::success(Resource::SecureScores, generation, vec![scores(12.0)]));
        let pending = store.begin(Resource::SecureScores);

        store.reset_all();

        assert_eq!(store.scores, ScoresSlice::default());
        assert_eq!(store.tenants, TenantsSlice::default());
        assert_eq!(*store.status(Resource::SecureScores), RequestStatus::Idle);
        assert!(!store.complete(Completion::success(
            Resource::SecureScores,
            pending,
            vec![scores(99.0)]
        )));
    }
}
