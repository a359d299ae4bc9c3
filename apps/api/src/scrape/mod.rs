//! Scrape orchestration.
//!
//! Runs the selected source adapters concurrently under a bounded pool, each
//! worker sequential over its own pages. Results are deduplicated by posting
//! identity as they arrive; a source failure is contained and recorded, never
//! fatal to the run. Caps are soft deadlines checked between page fetches,
//! so an in-flight call always completes.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::models::posting::{JobPosting, PostingKey};
use crate::sources::{JobSource, SearchQuery};

/// Caps for one discovery run.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryLimits {
    pub max_jobs: usize,
    pub max_pages_per_source: usize,
    pub max_concurrent_sources: usize,
}

/// Outcome of one source's pagination loop: how many postings it contributed
/// and the error that stopped it, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: String,
    pub count: usize,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct DiscoveryResult {
    /// Deduplicated postings in acceptance order, truncated to `max_jobs`.
    pub postings: Vec<JobPosting>,
    /// One entry per queried source, in the run's source order.
    pub statuses: Vec<SourceStatus>,
}

impl DiscoveryResult {
    /// True when every queried source errored. The orchestrator still
    /// returns normally in that case; callers decide how to degrade.
    pub fn all_failed(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.iter().all(|s| s.error.is_some())
    }
}

/// The only mutable state shared across workers. Guarded by one mutex;
/// first-seen insertion decides dedup winners.
struct DedupState {
    seen: HashSet<PostingKey>,
    accepted: Vec<JobPosting>,
}

/// Runs every source to completion (or cutoff) and merges the results.
pub async fn discover(
    sources: &[Arc<dyn JobSource>],
    query: &SearchQuery,
    limits: DiscoveryLimits,
) -> DiscoveryResult {
    let state = Arc::new(Mutex::new(DedupState {
        seen: HashSet::new(),
        accepted: Vec::new(),
    }));
    let semaphore = Arc::new(Semaphore::new(limits.max_concurrent_sources));
    let mut workers: JoinSet<SourceStatus> = JoinSet::new();

    for source in sources {
        let source = source.clone();
        let query = query.clone();
        let state = state.clone();
        let semaphore = semaphore.clone();
        workers.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            run_source(source, query, state, limits).await
        });
    }

    let mut statuses = Vec::new();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(status) => statuses.push(status),
            Err(e) => warn!("source worker panicked: {e}"),
        }
    }

    // Completion order is arrival order; report in the run's source order.
    statuses.sort_by_key(|status| {
        sources
            .iter()
            .position(|s| s.id() == status.source)
            .unwrap_or(usize::MAX)
    });

    let mut guard = state.lock().await;
    let mut postings = std::mem::take(&mut guard.accepted);
    drop(guard);

    // Cooperative cap checks allow slight overshoot; trim by insertion order.
    postings.truncate(limits.max_jobs);

    info!(
        "discovery merged {} unique postings from {} sources ({} failed)",
        postings.len(),
        statuses.len(),
        statuses.iter().filter(|s| s.error.is_some()).count()
    );

    DiscoveryResult { postings, statuses }
}

/// One source's sequential pagination loop.
async fn run_source(
    source: Arc<dyn JobSource>,
    query: SearchQuery,
    state: Arc<Mutex<DedupState>>,
    limits: DiscoveryLimits,
) -> SourceStatus {
    let id = source.id();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;
    let mut accepted = 0usize;

    loop {
        if pages >= limits.max_pages_per_source {
            break;
        }
        // Cooperative global cap check between pages, never mid-call.
        if state.lock().await.accepted.len() >= limits.max_jobs {
            break;
        }

        match source.fetch_page(&query, page_token.as_deref()).await {
            Ok(page) => {
                pages += 1;
                let mut guard = state.lock().await;
                for posting in page.postings {
                    if guard.seen.insert(posting.identity_key()) {
                        guard.accepted.push(posting);
                        accepted += 1;
                    }
                }
                drop(guard);

                match page.next_page {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
            Err(e) => {
                // Postings from pages that already parsed stay in the run.
                warn!("source '{id}' unavailable: {e}");
                return SourceStatus {
                    source: id.to_string(),
                    count: accepted,
                    error: Some(e.to_string()),
                };
            }
        }
    }

    SourceStatus {
        source: id.to_string(),
        count: accepted,
        error: None,
    }
}
