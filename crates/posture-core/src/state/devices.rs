use super::Slice;
use crate::domain::{AnalystCommentary, UnencryptedDevice};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicesSlice {
    pub unencrypted_devices: Vec<UnencryptedDevice>,
    pub commentary: Option<AnalystCommentary>,
}

impl DevicesSlice {
    pub fn non_compliant_count(&self) -> usize {
        self.unencrypted_devices.iter().filter(|d| !d.is_compliant()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DevicesAction {
    SetUnencryptedDevices(Vec<UnencryptedDevice>),
    SetCommentary(Option<AnalystCommentary>),
    Reset,
}

impl Slice for DevicesSlice {
    type Action = DevicesAction;

    fn reduce(&mut self, action: DevicesAction) {
        match action {
            DevicesAction::SetUnencryptedDevices(devices) => self.unencrypted_devices = devices,
            DevicesAction::SetCommentary(commentary) => self.commentary = commentary,
            DevicesAction::Reset => self.reset(),
        }
    }
}
