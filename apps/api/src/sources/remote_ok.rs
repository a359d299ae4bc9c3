//! Remote OK adapter.
//!
//! The board exposes one JSON document at `/api`; the first array element is
//! a legal/metadata blob and must be skipped. There is no server-side search
//! and no pagination, so the adapter filters client-side against the query
//! and always reports exhaustion after the first page.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::models::posting::JobPosting;
use crate::sources::{
    extract_email, extract_salary, snippet, strip_html, JobSource, SearchQuery, SourceError,
    SourcePage,
};

const API_URL: &str = "https://remoteok.com/api";
const DESCRIPTION_MAX: usize = 1500;

pub struct RemoteOkSource {
    client: reqwest::Client,
}

impl RemoteOkSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Raw Remote OK listing. Fields default because the feed mixes record
/// shapes; anything unusable is dropped during normalization.
#[derive(Debug, Deserialize)]
struct RemoteOkJob {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    salary_min: Option<u64>,
    #[serde(default)]
    salary_max: Option<u64>,
}

#[async_trait]
impl JobSource for RemoteOkSource {
    fn id(&self) -> &'static str {
        "remoteok"
    }

    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page_token: Option<&str>,
    ) -> Result<SourcePage, SourceError> {
        // Single-page source: any non-initial token means we are done.
        if page_token.is_some() {
            return Ok(SourcePage {
                postings: vec![],
                next_page: None,
            });
        }

        let response = self.client.get(API_URL).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let raw: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        // data[0] is metadata, not a listing.
        let postings: Vec<JobPosting> = raw
            .into_iter()
            .skip(1)
            .filter_map(|value| serde_json::from_value::<RemoteOkJob>(value).ok())
            .filter_map(|job| normalize(job, query))
            .collect();

        debug!("Remote OK returned {} relevant postings", postings.len());

        Ok(SourcePage {
            postings,
            next_page: None,
        })
    }
}

fn normalize(job: RemoteOkJob, query: &SearchQuery) -> Option<JobPosting> {
    let title = job.position.filter(|t| !t.trim().is_empty())?;
    let description = strip_html(job.description.as_deref().unwrap_or_default());

    let relevance_text = format!("{} {} {}", title, description, job.tags.join(" "));
    if !query.matches(&relevance_text) {
        return None;
    }

    let salary = match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) if max > 0 => Some(format!("${min} - ${max}")),
        _ => extract_salary(&description),
    };

    let posted_date = job
        .date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.date_naive())
        .unwrap_or_else(|| Utc::now().date_naive());

    Some(JobPosting {
        contact_email: extract_email(&description),
        title,
        company: job.company.unwrap_or_else(|| "Unknown Company".to_string()),
        location: job
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "Remote".to_string()),
        salary,
        description: snippet(&description, DESCRIPTION_MAX),
        tags: job.tags,
        source: "remoteok".to_string(),
        url: job.url.unwrap_or_default(),
        posted_date,
        external_id: job.id.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }),
        scraped_at: Utc::now(),
    })
}
