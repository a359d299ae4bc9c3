use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::matching::MatchResult;

/// Which path produced a cover letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    Api,
    Template,
}

/// A generated cover letter plus the method tag. Ephemeral: folded into the
/// final application row, never persisted on its own.
#[derive(Debug, Clone)]
pub struct GeneratedLetter {
    pub text: String,
    pub method: GenerationMethod,
}

/// One output row per matched posting, consumed by collaborators for
/// persistence and export. The pipeline seeds `application_status` as
/// "pending" and never advances it; status transitions belong downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub posted_date: NaiveDate,
    pub url: String,
    pub contact_email: Option<String>,
    pub source: String,
    pub scraped_date: DateTime<Utc>,
    pub application_status: String,
    pub match_score: f64,
    pub combined_score: f64,
    /// Compatibility duplicate of `match_score` kept for downstream readers.
    pub score: f64,
    pub match_reason: String,
    pub rank: usize,
    pub cover_letter: Option<String>,
    pub generation_method: Option<GenerationMethod>,
}

pub const SALARY_NOT_SPECIFIED: &str = "Not specified";
pub const STATUS_PENDING: &str = "pending";

impl ApplicationRow {
    /// Flattens a match result (and, for top-ranked matches, its generated
    /// letter) into the export shape.
    pub fn from_match(result: &MatchResult, letter: Option<&GeneratedLetter>) -> Self {
        let posting = &result.posting;
        ApplicationRow {
            title: posting.title.clone(),
            company: posting.company.clone(),
            location: posting.location.clone(),
            salary: posting
                .salary
                .clone()
                .unwrap_or_else(|| SALARY_NOT_SPECIFIED.to_string()),
            description: posting.description.clone(),
            tags: posting.tags.clone(),
            posted_date: posting.posted_date,
            url: posting.url.clone(),
            contact_email: posting.contact_email.clone(),
            source: posting.source.clone(),
            scraped_date: posting.scraped_at,
            application_status: STATUS_PENDING.to_string(),
            match_score: result.match_score,
            combined_score: result.combined_score,
            score: result.match_score,
            match_reason: result.match_reason.clone(),
            rank: result.rank,
            cover_letter: letter.map(|l| l.text.clone()),
            generation_method: letter.map(|l| l.method),
        }
    }
}
