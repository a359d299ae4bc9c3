use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One normalized job posting, independent of which source produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    /// `None` is the "not specified" sentinel.
    pub salary: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    /// Stable identifier of the adapter that produced this posting.
    pub source: String,
    pub url: String,
    pub contact_email: Option<String>,
    pub posted_date: NaiveDate,
    /// Source-native posting id, when the source exposes one.
    pub external_id: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Dedup identity of a posting within one discovery run.
///
/// Native source ids win when present; otherwise identity falls back to the
/// normalized (title, company, location) triple so the same role listed on
/// two boards collapses to one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostingKey {
    Native { source: String, id: String },
    Derived { title: String, company: String, location: String },
}

impl JobPosting {
    pub fn identity_key(&self) -> PostingKey {
        match &self.external_id {
            Some(id) => PostingKey::Native {
                source: self.source.clone(),
                id: id.clone(),
            },
            None => PostingKey::Derived {
                title: normalize(&self.title),
                company: normalize(&self.company),
                location: normalize(&self.location),
            },
        }
    }

    /// Text haystack used by the match scorer: title + description + tags.
    pub fn match_text(&self) -> String {
        let mut text = String::with_capacity(
            self.title.len() + self.description.len() + self.tags.len() * 8 + 2,
        );
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text.to_lowercase()
    }
}

/// Lower-cases and collapses runs of whitespace to single spaces.
fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(source: &str, external_id: Option<&str>, title: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: "Acme Ltd".to_string(),
            location: "Remote".to_string(),
            salary: None,
            description: "Build things".to_string(),
            tags: vec!["rust".to_string()],
            source: source.to_string(),
            url: "https://example.com/job/1".to_string(),
            contact_email: None,
            posted_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            external_id: external_id.map(|s| s.to_string()),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_native_id_wins_over_derived_key() {
        let p = posting("remoteok", Some("12345"), "Backend Engineer");
        assert_eq!(
            p.identity_key(),
            PostingKey::Native {
                source: "remoteok".to_string(),
                id: "12345".to_string()
            }
        );
    }

    #[test]
    fn test_derived_key_is_case_and_whitespace_insensitive() {
        let a = posting("remoteok", None, "Backend  Engineer");
        let b = posting("arbeitnow", None, "backend engineer");
        // Same normalized triple, different sources: still the same identity.
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_same_native_id_on_different_sources_is_distinct() {
        let a = posting("remoteok", Some("1"), "Backend Engineer");
        let b = posting("arbeitnow", Some("1"), "Backend Engineer");
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_match_text_contains_tags_lowercased() {
        let mut p = posting("remoteok", None, "Senior Rust Engineer");
        p.tags = vec!["DeFi".to_string()];
        let text = p.match_text();
        assert!(text.contains("senior rust engineer"));
        assert!(text.contains("defi"));
    }
}
