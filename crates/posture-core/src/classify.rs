//! Threshold rules behind the score widgets and risk indicators

/// Colour family a view should use; kept toolkit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `> 70` High, `(30, 70]` Medium, `<= 30` Low. NaN is Low.
    pub fn from_percent(percent: f64) -> Self {
        if percent > 70.0 {
            RiskLevel::High
        } else if percent > 30.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Risk shown next to a category score is whatever the score leaves uncovered.
    pub fn from_score(score_percent: f64) -> Self {
        Self::from_percent(100.0 - score_percent)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            RiskLevel::Low => Tone::Green,
            RiskLevel::Medium => Tone::Yellow,
            RiskLevel::High => Tone::Red,
        }
    }
}

/// Grade of the current secure score widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    Good,
    NeedsImprovement,
    Critical,
}

impl ScoreGrade {
    /// `>= 70` Good, `[40, 70)` Needs Improvement, `< 40` Critical. NaN is Critical.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 70.0 {
            ScoreGrade::Good
        } else if percentage >= 40.0 {
            ScoreGrade::NeedsImprovement
        } else {
            ScoreGrade::Critical
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScoreGrade::Good => "Good",
            ScoreGrade::NeedsImprovement => "Needs Improvement",
            ScoreGrade::Critical => "Critical",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            ScoreGrade::Good => Tone::Green,
            ScoreGrade::NeedsImprovement => Tone::Yellow,
            ScoreGrade::Critical => Tone::Red,
        }
    }
}

/// Signed change between the last two points of a series.
pub fn score_trend(percentages: &[f64]) -> Option<f64> {
    match percentages {
        [.., previous, latest] => Some(latest - previous),
        _ => None,
    }
}
