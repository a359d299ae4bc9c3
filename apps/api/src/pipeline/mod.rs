//! Pipeline coordination.
//!
//! One discovery run sequences the stages: confidence gate → concurrent
//! scrape → scoring over the full deduplicated set → ranking → rate-limited
//! generation for the top N matches. Ranking is decided before any
//! generation call so the expensive stage only sees the postings that earned
//! it, and the run always completes with a result set and a status report.

pub mod handlers;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::generator::CoverLetterGenerator;
use crate::matcher::{self, MatchWeights};
use crate::models::profile::CvProfile;
use crate::models::report::ApplicationRow;
use crate::scrape::{self, DiscoveryLimits, SourceStatus};
use crate::sources::{self, JobSource, SearchQuery};

/// Terminal status of a discovery run. Both are successful completions;
/// `NoSourcesAvailable` tells the caller that every source degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NoSourcesAvailable,
}

/// Full outcome of one run, with provenance for every decision made.
#[derive(Debug, Serialize)]
pub struct DiscoveryReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub matches: Vec<ApplicationRow>,
    pub sources: Vec<SourceStatus>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Caller overrides for a single run; anything unset falls back to config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunOverrides {
    pub query: Option<String>,
    pub max_jobs: Option<usize>,
    pub max_pages_per_source: Option<usize>,
    pub top_n: Option<usize>,
}

/// Runs the whole pipeline for one profile.
///
/// Hard errors are limited to the confidence gate; scrape and generation
/// failures degrade into the report instead.
pub async fn run_discovery(
    profile: &CvProfile,
    registry: &[Arc<dyn JobSource>],
    generator: &CoverLetterGenerator,
    weights: &MatchWeights,
    config: &Config,
    overrides: RunOverrides,
) -> Result<DiscoveryReport, AppError> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();

    // Discovery only runs behind a trusted profile.
    if !profile.meets_floor(config.confidence_floor) {
        return Err(AppError::UnprocessableEntity(format!(
            "Profile confidence {:.2} is below the discovery floor {:.2}. Upload a richer CV.",
            profile.confidence, config.confidence_floor
        )));
    }

    let query = match &overrides.query {
        Some(q) if !q.trim().is_empty() => SearchQuery::from_terms(vec![q.trim().to_string()]),
        _ => SearchQuery::from_terms(profile.keywords.clone()),
    };

    // Deterministic per-profile source order; also the ranking tie-breaker.
    let ordered = sources::order_for_profile(registry, profile);
    let source_order: Vec<String> = ordered.iter().map(|s| s.id().to_string()).collect();

    let limits = DiscoveryLimits {
        max_jobs: overrides.max_jobs.unwrap_or(config.max_jobs),
        max_pages_per_source: overrides
            .max_pages_per_source
            .unwrap_or(config.max_pages_per_source),
        max_concurrent_sources: config.max_concurrent_sources,
    };

    info!(
        "run {run_id}: discovering via [{}] (query: {:?})",
        source_order.join(", "),
        query.terms
    );

    let discovery = scrape::discover(&ordered, &query, limits).await;

    if discovery.all_failed() {
        info!("run {run_id}: no sources available");
        return Ok(DiscoveryReport {
            run_id,
            status: RunStatus::NoSourcesAvailable,
            matches: vec![],
            sources: discovery.statuses,
            started_at,
            finished_at: Utc::now(),
        });
    }

    // Score the full deduplicated set before any generation call.
    let today = Utc::now().date_naive();
    let mut results: Vec<_> = discovery
        .postings
        .iter()
        .map(|posting| matcher::score(posting, profile, weights, today))
        .collect();
    matcher::rank(&mut results, &source_order);

    // Generation is bounded: top N ranked matches above the score threshold.
    let top_n = overrides.top_n.unwrap_or(config.top_n);
    let mut matches = Vec::with_capacity(results.len());
    for result in &results {
        let letter = if result.rank <= top_n && result.match_score >= config.min_match_score {
            Some(generator.generate(profile, &result.posting).await)
        } else {
            None
        };
        matches.push(ApplicationRow::from_match(result, letter.as_ref()));
    }

    let generated = matches.iter().filter(|m| m.cover_letter.is_some()).count();
    info!(
        "run {run_id}: {} matches ranked, {} letters generated",
        matches.len(),
        generated
    );

    Ok(DiscoveryReport {
        run_id,
        status: RunStatus::Completed,
        matches,
        sources: discovery.statuses,
        started_at,
        finished_at: Utc::now(),
    })
}
