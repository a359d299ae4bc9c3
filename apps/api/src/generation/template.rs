//! Template fallback: fixed-structure cover letter filled from the profile
//! and the posting. No external dependency; it always succeeds, which makes
//! it the terminal safety net of the generation state machine.

use crate::models::posting::JobPosting;
use crate::models::profile::CvProfile;

/// Skills quoted in the letter body.
const TEMPLATE_SKILLS: usize = 3;

/// Renders the deterministic fallback letter.
pub fn render(profile: &CvProfile, posting: &JobPosting) -> String {
    let skills_clause = match profile
        .skills
        .iter()
        .take(TEMPLATE_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .as_slice()
    {
        [] => "my professional background".to_string(),
        shown => format!("my background in {}", shown.join(", ")),
    };

    format!(
        "Dear Hiring Manager,\n\n\
        I am writing to express my strong interest in the {title} position at {company}. \
        Based on {skills_clause}, I believe I would be a valuable addition to your team.\n\n\
        My experience covers the key qualifications mentioned in your posting, and I am \
        particularly drawn to this opportunity because it aligns with my professional focus.\n\n\
        I would welcome the chance to discuss how my skills can contribute to {company}'s \
        continued success. Thank you for considering my application.\n\n\
        Best regards",
        title = posting.title,
        company = posting.company,
        skills_clause = skills_clause,
    )
}
