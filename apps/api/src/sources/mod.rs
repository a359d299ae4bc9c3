//! Source adapters: one per external job board, each knowing that board's
//! pagination and response shape, all producing normalized [`JobPosting`]s.
//!
//! Adapters are stateless across calls; pagination state travels in opaque
//! page tokens handed back by the orchestrator. Network and parse failures
//! surface as [`SourceError`]; the orchestrator tags them with the source id
//! and keeps the run alive.

pub mod adzuna;
pub mod arbeitnow;
pub mod remote_ok;

use std::sync::Arc;
use std::sync::OnceLock;

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::models::posting::JobPosting;
use crate::models::profile::CvProfile;
use crate::profile::vocabulary::INDUSTRIES;
use crate::sources::adzuna::AdzunaSource;
use crate::sources::arbeitnow::ArbeitnowSource;
use crate::sources::remote_ok::RemoteOkSource;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Query handed to every adapter for one discovery run.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Ordered search terms, most relevant first.
    pub terms: Vec<String>,
}

impl SearchQuery {
    pub fn from_terms(terms: Vec<String>) -> Self {
        Self { terms }
    }

    /// Term used by sources that accept a single search string.
    pub fn primary_term(&self) -> &str {
        self.terms
            .first()
            .map(String::as_str)
            .unwrap_or("software engineer")
    }

    /// Client-side relevance check for sources without server-side search.
    /// An empty query accepts everything.
    pub fn matches(&self, haystack: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let lower = haystack.to_lowercase();
        self.terms.iter().any(|t| lower.contains(&t.to_lowercase()))
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("response shape not understood: {0}")]
    Parse(String),
}

/// One page of normalized postings plus the token for the next page.
/// `next_page == None` means the source is exhausted for this query.
#[derive(Debug)]
pub struct SourcePage {
    pub postings: Vec<JobPosting>,
    pub next_page: Option<String>,
}

/// The adapter seam. Implementations must be safe to call repeatedly with
/// any token they previously returned and must not retain cross-call state
/// beyond what the token encodes.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Stable identifier used in dedup keys, status reports and logs.
    fn id(&self) -> &'static str;

    /// Fetches one page. `page_token == None` requests the first page.
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page_token: Option<&str>,
    ) -> Result<SourcePage, SourceError>;
}

/// Builds the adapter registry once at startup. Credentialed sources are
/// registered only when their configuration is present.
pub fn build_registry(config: &Config) -> anyhow::Result<Vec<Arc<dyn JobSource>>> {
    let client = build_http_client(config.http_timeout_secs)?;

    let mut sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(RemoteOkSource::new(client.clone())),
        Arc::new(ArbeitnowSource::new(client.clone())),
    ];

    match (&config.adzuna_app_id, &config.adzuna_app_key) {
        (Some(app_id), Some(app_key)) => {
            sources.push(Arc::new(AdzunaSource::new(
                client,
                app_id.clone(),
                app_key.clone(),
            )));
        }
        _ => info!("Adzuna credentials not configured; adapter skipped"),
    }

    Ok(sources)
}

/// Orders the registry for one run: the profile's industry-preferred sources
/// first, then the remainder in registry order. Deterministic for identical
/// profiles, so discovery is reproducible.
pub fn order_for_profile(
    sources: &[Arc<dyn JobSource>],
    profile: &CvProfile,
) -> Vec<Arc<dyn JobSource>> {
    let preferred: &[&str] = INDUSTRIES
        .iter()
        .find(|i| i.name == profile.primary_industry)
        .map(|i| i.preferred_sources)
        .unwrap_or(&[]);

    let mut ordered: Vec<Arc<dyn JobSource>> = Vec::with_capacity(sources.len());
    for want in preferred {
        if let Some(source) = sources.iter().find(|s| s.id() == *want) {
            if !ordered.iter().any(|o| o.id() == source.id()) {
                ordered.push(source.clone());
            }
        }
    }
    for source in sources {
        if !ordered.iter().any(|o| o.id() == source.id()) {
            ordered.push(source.clone());
        }
    }
    ordered
}

fn build_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client for source adapters")
}

// ────────────────────────────────────────────────────────────────────────────
// Shared field extraction helpers
// ────────────────────────────────────────────────────────────────────────────

/// Pulls a salary mention out of free text, e.g. "£60,000 - £80,000" or
/// "$120k". Returns `None` when nothing salary-shaped appears.
pub(crate) fn extract_salary(text: &str) -> Option<String> {
    static SALARY_RE: OnceLock<Regex> = OnceLock::new();
    let re = SALARY_RE.get_or_init(|| {
        Regex::new(
            r"[$£€]\s*\d{1,3}(?:[,.]?\d{3})*\s*[kK]?(?:\s*[-–]\s*[$£€]?\s*\d{1,3}(?:[,.]?\d{3})*\s*[kK]?)?",
        )
        .expect("salary pattern is valid")
    });
    re.find(text).map(|m| m.as_str().trim().to_string())
}

/// First email address appearing in the text, if any.
pub(crate) fn extract_email(text: &str) -> Option<String> {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern is valid")
    });
    re.find(text).map(|m| m.as_str().to_string())
}

/// Drops HTML tags and collapses whitespace. Good enough for description
/// snippets; this is not an HTML renderer.
pub(crate) fn strip_html(text: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));
    let without_tags = re.replace_all(text, " ");
    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Head-truncates a description to `max` characters on a char boundary.
pub(crate) fn snippet(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
