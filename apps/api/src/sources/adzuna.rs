//! Adzuna adapter (UK index).
//!
//! Numbered result pages at `/v1/api/jobs/gb/search/{page}` with app
//! credentials as query parameters. A short page signals exhaustion.
//! Registered only when credentials are configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::models::posting::JobPosting;
use crate::sources::{
    extract_email, snippet, strip_html, JobSource, SearchQuery, SourceError, SourcePage,
};

const API_BASE: &str = "https://api.adzuna.com/v1/api/jobs/gb/search";
const RESULTS_PER_PAGE: usize = 20;
const DESCRIPTION_MAX: usize = 1500;

pub struct AdzunaSource {
    client: reqwest::Client,
    app_id: String,
    app_key: String,
}

impl AdzunaSource {
    pub fn new(client: reqwest::Client, app_id: String, app_key: String) -> Self {
        Self {
            client,
            app_id,
            app_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdzunaResponse {
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Deserialize)]
struct AdzunaJob {
    id: String,
    title: String,
    #[serde(default)]
    company: AdzunaName,
    #[serde(default)]
    location: AdzunaName,
    #[serde(default)]
    description: String,
    #[serde(default)]
    salary_min: Option<f64>,
    #[serde(default)]
    salary_max: Option<f64>,
    redirect_url: String,
    /// ISO-8601 creation timestamp.
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    category: Option<AdzunaCategory>,
}

#[derive(Debug, Default, Deserialize)]
struct AdzunaName {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdzunaCategory {
    #[serde(default)]
    label: Option<String>,
}

#[async_trait]
impl JobSource for AdzunaSource {
    fn id(&self) -> &'static str {
        "adzuna"
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
            .get(format!("{API_BASE}/{page}"))
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("what", query.primary_term()),
                ("results_per_page", &RESULTS_PER_PAGE.to_string()),
                ("content-type", "application/json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body: AdzunaResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let full_page = body.results.len() == RESULTS_PER_PAGE;
        let postings: Vec<JobPosting> = body.results.into_iter().map(normalize).collect();

        debug!(
            "Adzuna page {} returned {} postings (full page: {})",
            page,
            postings.len(),
            full_page
        );

        Ok(SourcePage {
            postings,
            next_page: full_page.then(|| (page + 1).to_string()),
        })
    }
}

fn normalize(job: AdzunaJob) -> JobPosting {
    let description = strip_html(&job.description);

    let salary = match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) if max > 0.0 => {
            Some(format!("£{:.0} - £{:.0}", min, max))
        }
        (Some(min), None) if min > 0.0 => Some(format!("£{:.0}", min)),
        _ => None,
    };

    let posted_date = job
        .created
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.date_naive())
        .unwrap_or_else(|| Utc::now().date_naive());

    JobPosting {
        contact_email: extract_email(&description),
        // Adzuna highlights query terms with markup inside titles.
        title: strip_html(&job.title),
        company: job
            .company
            .display_name
            .unwrap_or_else(|| "Unknown Company".to_string()),
        location: job
            .location
            .display_name
            .unwrap_or_else(|| "UK".to_string()),
        salary,
        description: snippet(&description, DESCRIPTION_MAX),
        tags: job
            .category
            .and_then(|c| c.label)
            .map(|label| vec![label])
            .unwrap_or_default(),
        source: "adzuna".to_string(),
        url: job.redirect_url,
        posted_date,
        external_id: Some(job.id),
        scraped_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> AdzunaJob {
        AdzunaJob {
            id: "4403837248".to_string(),
            title: "Senior <strong>DevOps</strong> Engineer".to_string(),
            company: AdzunaName {
                display_name: Some("Northern Grid".to_string()),
            },
            location: AdzunaName {
                display_name: Some("Manchester, Greater Manchester".to_string()),
            },
            description: "Kubernetes platform work. Reach us at recruiting@grid.example."
                .to_string(),
            salary_min: Some(65_000.0),
            salary_max: Some(80_000.0),
            redirect_url: "https://www.adzuna.co.uk/jobs/details/4403837248".to_string(),
            created: Some("2026-07-30T00:00:00Z".to_string()),
            category: Some(AdzunaCategory {
                label: Some("IT Jobs".to_string()),
            }),
        }
    }

    #[test]
    fn test_normalize_strips_title_markup() {
        let posting = normalize(sample_job());
        assert_eq!(posting.title, "Senior DevOps Engineer");
        assert_eq!(posting.external_id.as_deref(), Some("4403837248"));
        assert_eq!(posting.salary.as_deref(), Some("£65000 - £80000"));
        assert_eq!(posting.tags, vec!["IT Jobs".to_string()]);
        assert_eq!(posting.contact_email.as_deref(), Some("recruiting@grid.example"));
    }

    #[test]
    fn test_missing_salary_is_sentinel_none() {
        let mut job = sample_job();
        job.salary_min = None;
        job.salary_max = None;
        assert!(normalize(job).salary.is_none());
    }

    #[test]
    fn test_response_shape_parses_with_missing_optionals() {
        let json = r#"{
            "results": [{
                "id": "1",
                "title": "Engineer",
                "redirect_url": "https://example.com/1"
            }]
        }"#;
        let parsed: AdzunaResponse = serde_json::from_str(json).unwrap();
        let posting = normalize(parsed.results.into_iter().next().unwrap());
        assert_eq!(posting.company, "Unknown Company");
        assert_eq!(posting.location, "UK");
        assert!(posting.salary.is_none());
    }
}
