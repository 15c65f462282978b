use super::Slice;
use crate::domain::AuditLog;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditSlice {
    pub entries: Vec<AuditLog>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditLogAction {
    SetEntries(Vec<AuditLog>),
    Reset,
}

impl Slice for AuditSlice {
    type Action = AuditLogAction;

    fn reduce(&mut self, action: AuditLogAction) {
        match action {
            AuditLogAction::SetEntries(entries) => self.entries = entries,
            AuditLogAction::Reset => self.reset(),
        }
    }
}
