use super::Slice;
use crate::domain::{AnalystCommentary, CloudFinding};

/// Cloud and infrastructure findings from the apps report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudSlice {
    pub findings: Vec<CloudFinding>,
    pub commentary: Option<AnalystCommentary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloudAction {
    SetFindings(Vec<CloudFinding>),
    SetCommentary(Option<AnalystCommentary>),
    Reset,
}

impl Slice for CloudSlice {
    type Action = CloudAction;

    fn reduce(&mut self, action: CloudAction) {
        match action {
            CloudAction::SetFindings(findings) => self.findings = findings,
            CloudAction::SetCommentary(commentary) => self.commentary = commentary,
            CloudAction::Reset => self.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnalystComment;
    use chrono::NaiveDate;

    #[test]
    fn test_reset_clears_findings_and_commentary() {
        let mut slice = CloudSlice::default();
        slice.reduce(CloudAction::SetFindings(vec![CloudFinding {
            name: "Legacy auth enabled".into(),
            status: "open".into(),
            severity: "high".into(),
        }]));
        slice.reduce(CloudAction::SetCommentary(Some(AnalystCommentary {
            latest: AnalystComment {
                comment: "Block legacy auth".into(),
                author: "SOC".into(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            },
            previous: Vec::new(),
        })));
        assert!(slice.commentary.is_some());

        slice.reduce(CloudAction::Reset);
        assert_eq!(slice, CloudSlice::default());
    }
}
