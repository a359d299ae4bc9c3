use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Experience tier inferred from résumé text.
///
/// The ladder is deliberately small: leadership/expert indicators map to
/// `Senior`, entry-level indicators to `Junior`, everything else to `Mid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
        }
    }
}

/// Structured profile derived from one résumé upload.
///
/// Immutable once produced. A re-upload produces a new profile that
/// supersedes this one; nothing mutates an existing instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvProfile {
    pub id: Uuid,
    /// Skill tokens in vocabulary order, deduplicated, lower-cased.
    pub skills: Vec<String>,
    pub seniority: Seniority,
    pub primary_industry: String,
    /// Free-form search keywords derived from industry and skills.
    pub keywords: Vec<String>,
    /// Analysis confidence in [0, 1]. Never zero for non-empty input.
    pub confidence: f64,
    /// True when the résumé text was head-truncated before analysis.
    pub truncated: bool,
    pub analyzed_at: DateTime<Utc>,
}

impl CvProfile {
    /// Whether this profile is trusted enough to gate a discovery run.
    pub fn meets_floor(&self, confidence_floor: f64) -> bool {
        self.confidence >= confidence_floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Seniority::Senior).unwrap(), "\"senior\"");
        assert_eq!(serde_json::to_string(&Seniority::Mid).unwrap(), "\"mid\"");
        assert_eq!(serde_json::to_string(&Seniority::Junior).unwrap(), "\"junior\"");
    }

    #[test]
    fn test_meets_floor_boundary() {
        let profile = CvProfile {
            id: Uuid::new_v4(),
            skills: vec!["python".to_string()],
            seniority: Seniority::Mid,
            primary_industry: "general".to_string(),
            keywords: vec![],
            confidence: 0.2,
            truncated: false,
            analyzed_at: Utc::now(),
        };
        assert!(profile.meets_floor(0.2));
        assert!(!profile.meets_floor(0.21));
    }
}
