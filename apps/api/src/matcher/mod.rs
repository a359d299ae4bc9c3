//! Match scoring: pure, deterministic pairing of one posting against one
//! profile. No I/O; callers pass `today` in so results are reproducible.
//!
//! score = (skill overlap + capped seniority bonus) × recency multiplier,
//! combined = score + capped contact-email bonus. Everything clamps to [0, 1].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::matching::MatchResult;
use crate::models::posting::JobPosting;
use crate::models::profile::{CvProfile, Seniority};

/// Title terms granting the seniority alignment bonus for senior profiles.
const SENIOR_TITLE_TERMS: &[&str] = &["senior", "lead", "staff", "principal"];

/// Skills quoted in the human-readable match reason.
const REASON_SKILLS: usize = 4;

/// Scoring weights and caps. All tunable; defaults reflect the reference
/// behaviour: skills dominate, bonuses nudge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchWeights {
    /// Weight of the normalized skill-overlap component.
    pub skill_overlap: f64,
    /// Fixed bonus for a senior profile matched to a senior title.
    /// The value is its own cap; it is applied at most once.
    pub seniority_bonus: f64,
    /// Postings at most this many days old score full recency.
    pub recency_window_days: i64,
    /// Days over which the recency multiplier falls linearly to the floor.
    pub recency_decay_days: i64,
    /// Minimum recency multiplier. Age reduces a score, never disqualifies.
    pub recency_floor: f64,
    /// Bonus added to combined_score when a contact email is present.
    /// The value is its own cap.
    pub email_bonus: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skill_overlap: 0.8,
            seniority_bonus: 0.15,
            recency_window_days: 14,
            recency_decay_days: 60,
            recency_floor: 0.5,
            email_bonus: 0.05,
        }
    }
}

/// Scores one posting against one profile. Pure function: identical inputs
/// always produce identical output.
pub fn score(
    posting: &JobPosting,
    profile: &CvProfile,
    weights: &MatchWeights,
    today: NaiveDate,
) -> MatchResult {
    let haystack = posting.match_text();

    let matched: Vec<&str> = profile
        .skills
        .iter()
        .filter(|skill| haystack.contains(skill.as_str()))
        .map(String::as_str)
        .collect();
    let overlap = if profile.skills.is_empty() {
        0.0
    } else {
        matched.len() as f64 / profile.skills.len() as f64
    };

    let seniority_aligned = profile.seniority == Seniority::Senior && {
        let title = posting.title.to_lowercase();
        SENIOR_TITLE_TERMS.iter().any(|t| title.contains(t))
    };
    let bonus = if seniority_aligned { weights.seniority_bonus } else { 0.0 };

    let recency = recency_multiplier(posting.posted_date, today, weights);

    let match_score = ((overlap * weights.skill_overlap + bonus) * recency).clamp(0.0, 1.0);

    let email_bonus = if posting.contact_email.is_some() {
        weights.email_bonus
    } else {
        0.0
    };
    let combined_score = (match_score + email_bonus).clamp(0.0, 1.0);

    MatchResult {
        match_reason: build_reason(
            &matched,
            profile.skills.len(),
            seniority_aligned,
            email_bonus > 0.0,
            (today - posting.posted_date).num_days(),
        ),
        posting: posting.clone(),
        profile_id: profile.id,
        match_score,
        combined_score,
        rank: 0,
    }
}

/// Linear recency decay: full credit inside the window, then a straight
/// line down to the floor. Never zero and never negative, so an old posting
/// is demoted rather than disqualified.
fn recency_multiplier(posted: NaiveDate, today: NaiveDate, weights: &MatchWeights) -> f64 {
    let age_days = (today - posted).num_days();
    if age_days <= weights.recency_window_days {
        return 1.0;
    }
    let over = (age_days - weights.recency_window_days) as f64;
    let span = weights.recency_decay_days.max(1) as f64;
    let decayed = 1.0 - (over / span) * (1.0 - weights.recency_floor);
    decayed.max(weights.recency_floor)
}

fn build_reason(
    matched: &[&str],
    total_skills: usize,
    seniority_aligned: bool,
    has_email: bool,
    age_days: i64,
) -> String {
    let mut parts = Vec::new();

    if matched.is_empty() {
        parts.push("no skill overlap".to_string());
    } else {
        let shown: Vec<&str> = matched.iter().take(REASON_SKILLS).copied().collect();
        let suffix = if matched.len() > REASON_SKILLS { ", …" } else { "" };
        parts.push(format!(
            "{}/{} skills matched ({}{})",
            matched.len(),
            total_skills,
            shown.join(", "),
            suffix
        ));
    }
    if seniority_aligned {
        parts.push("senior title alignment".to_string());
    }
    if has_email {
        parts.push("contact email available".to_string());
    }
    if age_days >= 0 {
        parts.push(format!("posted {age_days} days ago"));
    }

    parts.join("; ")
}

/// Final ordering: combined score desc, most recent posted date, then the
/// run's source priority order. Assigns 1-based ranks in place.
pub fn rank(results: &mut [MatchResult], source_order: &[String]) {
    let priority = |source: &str| {
        source_order
            .iter()
            .position(|s| s == source)
            .unwrap_or(usize::MAX)
    };

    results.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then_with(|| b.posting.posted_date.cmp(&a.posting.posted_date))
            .then_with(|| priority(&a.posting.source).cmp(&priority(&b.posting.source)))
    });

    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index + 1;
    }
}
