use super::Slice;
use crate::domain::{AnalystCommentary, MfaEvaluation, Person};

/// Identities and people: MFA evaluation, user list and the analyst's notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentitiesSlice {
    pub mfa: MfaEvaluation,
    pub people: Vec<Person>,
    pub commentary: Option<AnalystCommentary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentitiesAction {
    SetMfa(MfaEvaluation),
    SetPeople(Vec<Person>),
    SetCommentary(Option<AnalystCommentary>),
    Reset,
}

impl IdentitiesSlice {
    pub fn people_without_mfa(&self) -> usize {
        self.people.iter().filter(|p| !p.mfa_registered).count()
    }
}

impl Slice for IdentitiesSlice {
    type Action = IdentitiesAction;

    fn reduce(&mut self, action: IdentitiesAction) {
        match action {
            IdentitiesAction::SetMfa(mfa) => self.mfa = mfa,
            IdentitiesAction::SetPeople(people) => self.people = people,
            IdentitiesAction::SetCommentary(commentary) => self.commentary = commentary,
            IdentitiesAction::Reset => self.reset(),
        }
    }
}
