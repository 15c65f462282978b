use std::collections::BTreeMap;

use super::Slice;
use crate::domain::{CategoryScore, ScoreCategory, SecureScoreEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoresSlice {
    pub secure_scores: Vec<SecureScoreEntry>,
    pub history: Vec<SecureScoreEntry>,
    pub categories: BTreeMap<ScoreCategory, CategoryScore>,
}

impl ScoresSlice {
    /// Last entry of the current series, which drives the secure score widget.
    pub fn current(&self) -> Option<&SecureScoreEntry> {
        self.secure_scores.last()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoresAction {
    SetSecureScores(Vec<SecureScoreEntry>),
    SetHistory(Vec<SecureScoreEntry>),
    SetCategoryScore(ScoreCategory, CategoryScore),
    Reset,
}

impl Slice for ScoresSlice {
    type Action = ScoresAction;

    fn reduce(&mut self, action: ScoresAction) {
        match action {
            ScoresAction::SetSecureScores(scores) => self.secure_scores = scores,
            ScoresAction::SetHistory(history) => self.history = history,
            ScoresAction::SetCategoryScore(category, score) => {
                self.categories.insert(category, score);
            }
            ScoresAction::Reset => self.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(month: &str, percentage: f64) -> SecureScoreEntry {
        SecureScoreEntry {
            month: month.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            percentage,
            comparative: None,
        }
    }

    #[test]
    fn test_set_secure_scores_replaces_wholesale() {
        let mut slice = ScoresSlice::default();
        slice.reduce(ScoresAction::SetSecureScores(vec![entry("Jan", 10.0), entry("Feb", 20.0)]));
        slice.reduce(ScoresAction::SetSecureScores(vec![entry("Mar", 30.0)]));

        assert_eq!(slice.secure_scores, vec![entry("Mar", 30.0)]);
        assert_eq!(slice.current().map(|e| e.percentage), Some(30.0));
    }

    #[test]
    fn test_set_empty_clears() {
        let mut slice = ScoresSlice::default();
        slice.reduce(ScoresAction::SetSecureScores(vec![entry("Jan", 10.0)]));
        slice.reduce(ScoresAction::SetSecureScores(Vec::new()));
        assert!(slice.current().is_none());
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut slice = ScoresSlice::default();
        slice.reduce(ScoresAction::SetHistory(vec![entry("Jan", 10.0)]));
        slice.reduce(ScoresAction::SetCategoryScore(
            ScoreCategory::Data,
            CategoryScore { percentage: 44.0, comparative: None },
        ));
        slice.reduce(ScoresAction::Reset);

        assert_eq!(slice, ScoresSlice::default());
    }
}
