use super::Slice;
use crate::domain::UserModel;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessSlice {
    pub users: Vec<UserModel>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessAction {
    SetUsers(Vec<UserModel>),
    /// Replace the user with the same id, or append it.
    UpsertUser(UserModel),
    Reset,
}

impl Slice for AccessSlice {
    type Action = AccessAction;

    fn reduce(&mut self, action: AccessAction) {
        match action {
            AccessAction::SetUsers(users) => self.users = users,
            AccessAction::UpsertUser(user) => {
                match self.users.iter_mut().find(|u| u.id == user.id) {
                    Some(existing) => *existing = user,
                    None => self.users.push(user),
                }
            }
            AccessAction::Reset => self.reset(),
        }
    }
}
