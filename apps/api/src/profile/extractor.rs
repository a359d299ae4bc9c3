//! Turns raw résumé text into a structured [`CvProfile`].
//!
//! Deterministic token-scan analysis: no network, no model calls. Unmatched
//! vocabulary is not an error; it yields an empty skill set with floor
//! confidence.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{CvProfile, Seniority};
use crate::profile::vocabulary::{
    skill_vocabulary, GENERAL_INDUSTRY, INDUSTRIES, JUNIOR_INDICATORS, SENIOR_INDICATORS,
    SENIOR_YEARS,
};

/// Confidence never drops below this for non-empty input.
const CONFIDENCE_FLOOR: f64 = 0.1;

/// Skill count granting full skill-coverage credit.
const FULL_CREDIT_SKILLS: f64 = 10.0;

/// Number of top skills folded into the search keyword set.
const KEYWORD_SKILLS: usize = 5;

/// Extracts a structured profile from résumé text.
///
/// Text beyond `max_length` characters is head-truncated before analysis and
/// the truncation is recorded in the profile. Empty or whitespace-only input
/// is a validation error; everything else succeeds.
pub fn extract(text: &str, max_length: usize) -> Result<CvProfile, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Résumé text is empty. Upload plain text extracted from the CV.".to_string(),
        ));
    }

    let truncated = trimmed.chars().count() > max_length;
    let analyzed: String = trimmed.chars().take(max_length).collect();
    let lower = analyzed.to_lowercase();

    let skills = scan_skills(&lower);
    let seniority = infer_seniority(&lower);
    let (primary_industry, industry_confidence) = detect_primary_industry(&lower);
    let keywords = build_keywords(primary_industry, &skills);
    let confidence = compute_confidence(skills.len(), industry_confidence);

    Ok(CvProfile {
        id: Uuid::new_v4(),
        skills,
        seniority,
        primary_industry: primary_industry.to_string(),
        keywords,
        confidence,
        truncated,
        analyzed_at: Utc::now(),
    })
}

/// Scans the fixed vocabulary against lower-cased text.
/// Output order follows vocabulary order, which makes profiles reproducible.
fn scan_skills(lower: &str) -> Vec<String> {
    skill_vocabulary()
        .into_iter()
        .filter(|token| lower.contains(token))
        .map(str::to_string)
        .collect()
}

/// Keyword ladder evaluated in priority order:
/// senior indicators (including claimed years) > junior indicators > mid.
fn infer_seniority(lower: &str) -> Seniority {
    let senior_term = SENIOR_INDICATORS.iter().any(|t| lower.contains(t));
    if senior_term || claimed_years(lower).is_some_and(|y| y >= SENIOR_YEARS) {
        return Seniority::Senior;
    }
    if JUNIOR_INDICATORS.iter().any(|t| lower.contains(t)) {
        return Seniority::Junior;
    }
    Seniority::Mid
}

/// Largest "N+ years" claim in the text, if any.
fn claimed_years(lower: &str) -> Option<u32> {
    static YEARS_RE: OnceLock<Regex> = OnceLock::new();
    let re = YEARS_RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s*\+?\s*years?").expect("years pattern is valid")
    });
    re.captures_iter(lower)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
}

/// Scores every industry cluster by keyword coverage and returns the winner
/// with its confidence. Ties resolve to the earlier table entry.
fn detect_primary_industry(lower: &str) -> (&'static str, f64) {
    let mut best: Option<(&'static str, f64, f64)> = None;

    for industry in INDUSTRIES {
        let hits = industry
            .keywords
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count();
        if hits == 0 {
            continue;
        }
        let score = hits as f64 / industry.keywords.len() as f64;
        let confidence = (score * 2.0).min(1.0);
        match best {
            Some((_, best_score, _)) if score <= best_score => {}
            _ => best = Some((industry.name, score, confidence)),
        }
    }

    match best {
        Some((name, _, confidence)) => (name, confidence),
        None => (GENERAL_INDUSTRY, 0.0),
    }
}

/// Search keywords = the primary industry's search terms plus the top skills,
/// deduplicated in that order.
fn build_keywords(primary_industry: &str, skills: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    if let Some(industry) = INDUSTRIES.iter().find(|i| i.name == primary_industry) {
        keywords.extend(industry.search_terms.iter().map(|t| t.to_string()));
    }
    for skill in skills.iter().take(KEYWORD_SKILLS) {
        if !keywords.contains(skill) {
            keywords.push(skill.clone());
        }
    }
    keywords
}

/// Mean of skill coverage and industry confidence, floored so non-empty
/// input never scores zero.
fn compute_confidence(skill_count: usize, industry_confidence: f64) -> f64 {
    let skill_part = (skill_count as f64 / FULL_CREDIT_SKILLS).min(1.0);
    let combined = (skill_part + industry_confidence) / 2.0;
    combined.max(CONFIDENCE_FLOOR).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVOPS_CV: &str = "Lead DevSecOps Engineer\n\
        8+ years experience in cloud infrastructure and security.\n\
        Skills: AWS, Azure, Kubernetes, Docker, Terraform, CI/CD, Jenkins, Python, GitOps";

    const GRADUATE_CV: &str = "Graduate seeking opportunities.\n\
        Skills: teamwork, communication, fast learning, tutoring, retail.\n\
        Education: 7 GCSEs including Maths and English.";

    #[test]
    fn test_empty_text_is_a_validation_error() {
        assert!(matches!(extract("", 1000), Err(AppError::Validation(_))));
        assert!(matches!(extract("   \n\t ", 1000), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_nonempty_text_always_has_positive_confidence() {
        // No vocabulary hit at all: empty skills, floor confidence, no error.
        let profile = extract("I enjoy long walks and gardening.", 1000).unwrap();
        assert!(profile.skills.is_empty());
        assert!(profile.confidence > 0.0);
        assert_eq!(profile.primary_industry, GENERAL_INDUSTRY);
    }

    #[test]
    fn test_devops_cv_extraction() {
        let profile = extract(DEVOPS_CV, 10_000).unwrap();
        assert_eq!(profile.seniority, Seniority::Senior);
        assert_eq!(profile.primary_industry, "devops_cloud");
        assert!(profile.skills.contains(&"kubernetes".to_string()));
        assert!(profile.skills.contains(&"terraform".to_string()));
        assert!(profile.confidence > 0.4, "confidence was {}", profile.confidence);
        assert!(!profile.truncated);
    }

    #[test]
    fn test_graduate_cv_is_junior() {
        let profile = extract(GRADUATE_CV, 10_000).unwrap();
        assert_eq!(profile.seniority, Seniority::Junior);
    }

    #[test]
    fn test_senior_terms_beat_junior_terms() {
        // Both appear; ladder priority picks senior.
        let profile = extract("Senior engineer mentoring junior developers. Python.", 1000).unwrap();
        assert_eq!(profile.seniority, Seniority::Senior);
    }

    #[test]
    fn test_years_claim_alone_makes_senior() {
        let profile = extract("Engineer with 7+ years building Python services.", 1000).unwrap();
        assert_eq!(profile.seniority, Seniority::Senior);
    }

    #[test]
    fn test_no_indicator_defaults_to_mid() {
        let profile = extract("Engineer working with Python and Docker.", 1000).unwrap();
        assert_eq!(profile.seniority, Seniority::Mid);
    }

    #[test]
    fn test_truncation_is_recorded_and_deterministic() {
        let long_text = format!("python {}", "x".repeat(5000));
        let a = extract(&long_text, 100).unwrap();
        let b = extract(&long_text, 100).unwrap();
        assert!(a.truncated);
        // Head truncation: the leading "python" survives in both runs.
        assert_eq!(a.skills, b.skills);
        assert!(a.skills.contains(&"python".to_string()));
    }

    #[test]
    fn test_skills_follow_vocabulary_order_and_dedup() {
        let profile = extract("docker docker kubernetes aws", 1000).unwrap();
        let aws = profile.skills.iter().position(|s| s == "aws").unwrap();
        let kube = profile.skills.iter().position(|s| s == "kubernetes").unwrap();
        let docker = profile.skills.iter().position(|s| s == "docker").unwrap();
        // Vocabulary order, not text order.
        assert!(aws < kube && kube < docker);
        assert_eq!(
            profile.skills.iter().filter(|s| *s == "docker").count(),
            1,
            "skills must be deduplicated"
        );
    }

    #[test]
    fn test_keywords_start_with_industry_search_terms() {
        let profile = extract(DEVOPS_CV, 10_000).unwrap();
        assert_eq!(profile.keywords[0], "devops");
        assert!(profile.keywords.len() > 2);
    }

    #[test]
    fn test_confidence_clamped_to_one() {
        assert!(compute_confidence(100, 1.0) <= 1.0);
        assert!(compute_confidence(0, 0.0) >= CONFIDENCE_FLOOR);
    }
}
