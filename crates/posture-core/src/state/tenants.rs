use super::Slice;
use crate::domain::{ManualWidget, Tenant};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantsSlice {
    pub tenants: Vec<Tenant>,
    pub selected: Option<String>,
    pub widgets: Vec<ManualWidget>,
}

impl TenantsSlice {
    pub fn selected_tenant(&self) -> Option<&Tenant> {
        let id = self.selected.as_deref()?;
        self.tenants.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TenantsAction {
    SetTenants(Vec<Tenant>),
    Select(Option<String>),
    SetWidgets(Vec<ManualWidget>),
    /// Result of a toggle; ignored unless `tenant_id` is still the selected tenant.
    UpsertWidget {
        tenant_id: String,
        widget: ManualWidget,
    },
    Reset,
}

impl Slice for TenantsSlice {
    type Action = TenantsAction;

    fn reduce(&mut self, action: TenantsAction) {
        match action {
            TenantsAction::SetTenants(tenants) => {
                self.tenants = tenants;
                // Drop a selection the new list no longer contains
                if self.selected_tenant().is_none() {
                    self.selected = None;
                }
            }
            TenantsAction::Select(id) => {
                if id.as_deref() != self.selected.as_deref() {
                    self.widgets.clear();
                }
                self.selected = id;
            }
            TenantsAction::SetWidgets(widgets) => self.widgets = widgets,
            TenantsAction::UpsertWidget { tenant_id, widget } => {
                if self.selected.as_deref() != Some(tenant_id.as_str()) {
                    return;
                }
                match self.widgets.iter_mut().find(|w| w.widget_id == widget.widget_id) {
                    Some(existing) => *existing = widget,
                    None => self.widgets.push(widget),
                }
            }
            TenantsAction::Reset => self.reset(),
        }
    }
}
