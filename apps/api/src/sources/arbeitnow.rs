//! Arbeitnow job-board adapter.
//!
//! Paginated JSON API (`?page=N`). The response's `links.next` field signals
//! whether more pages exist; the slug is the source-native id. No search
//! parameter, so query relevance is checked client-side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::models::posting::JobPosting;
use crate::sources::{
    extract_email, extract_salary, snippet, strip_html, JobSource, SearchQuery, SourceError,
    SourcePage,
};

const API_URL: &str = "https://www.arbeitnow.com/api/job-board-api";
const DESCRIPTION_MAX: usize = 1500;

pub struct ArbeitnowSource {
    client: reqwest::Client,
}

impl ArbeitnowSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    data: Vec<ArbeitnowJob>,
    #[serde(default)]
    links: ArbeitnowLinks,
}

#[derive(Debug, Default, Deserialize)]
struct ArbeitnowLinks {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: String,
    company_name: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    remote: bool,
    url: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    location: String,
    /// Unix timestamp.
    #[serde(default)]
    created_at: i64,
}

#[async_trait]
impl JobSource for ArbeitnowSource {
    fn id(&self) -> &'static str {
        "arbeitnow"
    }

    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page_token: Option<&str>,
    ) -> Result<SourcePage, SourceError> {
        let page: u32 = match page_token {
            Some(token) => token
                .parse()
                .map_err(|_| SourceError::Parse(format!("bad page token '{token}'")))?,
            None => 1,
        };

        let response = self
            .client
            .get(API_URL)
            .query(&[("page", page.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body: ArbeitnowResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let next_page = body.links.next.as_ref().map(|_| (page + 1).to_string());

        let postings: Vec<JobPosting> = body
            .data
            .into_iter()
            .filter_map(|job| normalize(job, query))
            .collect();

        debug!(
            "Arbeitnow page {} returned {} relevant postings (next: {})",
            page,
            postings.len(),
            next_page.is_some()
        );

        Ok(SourcePage { postings, next_page })
    }
}

fn normalize(job: ArbeitnowJob, query: &SearchQuery) -> Option<JobPosting> {
    if job.title.trim().is_empty() {
        return None;
    }

    let description = strip_html(&job.description);
    let relevance_text = format!("{} {} {}", job.title, description, job.tags.join(" "));
    if !query.matches(&relevance_text) {
        return None;
    }

    let posted_date = DateTime::<Utc>::from_timestamp(job.created_at, 0)
        .map(|d| d.date_naive())
        .unwrap_or_else(|| Utc::now().date_naive());

    let location = if job.location.trim().is_empty() {
        if job.remote { "Remote".to_string() } else { "Unknown".to_string() }
    } else {
        job.location
    };

    Some(JobPosting {
        salary: extract_salary(&description),
        contact_email: extract_email(&description),
        title: job.title,
        company: job.company_name,
        location,
        description: snippet(&description, DESCRIPTION_MAX),
        tags: job.tags,
        source: "arbeitnow".to_string(),
        url: job.url,
        posted_date,
        external_id: Some(job.slug),
        scraped_at: Utc::now(),
    })
}
