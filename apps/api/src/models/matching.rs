use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::posting::JobPosting;

/// Scored pairing of one posting against one profile.
///
/// Owned by a single discovery run and never mutated after creation; a
/// re-run produces fresh instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub posting: JobPosting,
    pub profile_id: Uuid,
    /// Feature-overlap score in [0, 1].
    pub match_score: f64,
    /// `match_score` blended with recency / contact-availability bonuses.
    pub combined_score: f64,
    pub match_reason: String,
    /// 1-based position after final ordering. Zero until ranking assigns it.
    pub rank: usize,
}
