//! Client state: one slice per backend area, plus a store that serialises dispatch
//! and tracks request status per resource.

mod access;
mod audit;
mod cloud;
mod devices;
mod identities;
mod scores;
mod store;
mod tenants;

pub use access::{AccessAction, AccessSlice};
pub use audit::{AuditLogAction, AuditSlice};
pub use cloud::{CloudAction, CloudSlice};
pub use devices::{DevicesAction, DevicesSlice};
pub use identities::{IdentitiesAction, IdentitiesSlice};
pub use scores::{ScoresAction, ScoresSlice};
pub use store::{Action, Completion, RequestStatus, Resource, Store};
pub use tenants::{TenantsAction, TenantsSlice};

/// A pure reducer over an owned subtree of state.
pub trait Slice: Default {
    type Action;

    fn reduce(&mut self, action: Self::Action);

    /// Restore the initial value.
    fn reset(&mut self) {
        *self = Self::default();
    }
}
