// Prompt constants for the generation stage. The placeholders are replaced
// by the generator before the call goes out.

/// Cover-letter prompt template.
/// Replace: {job_title}, {company}, {description}, {skills}, {seniority}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter for the {job_title} role at {company}.

Tone guidelines:
- Intelligent, warm, and natural: write like a thoughtful human, not a corporate robot
- Clear and concise, without unnecessary adjectives
- Confident and grounded in actual experience
- Free of inflated phrases like "I'm thrilled", "I'm passionate", or "amazing opportunity"

IMPORTANT:
Only include factual content pulled directly from the candidate summary below. Do not invent or exaggerate qualifications.

Job posting:
{description}

Candidate summary:
A {seniority}-level professional with hands-on experience in {skills}.

Write a concise, well-structured cover letter that demonstrates technical relevance and feels human and thoughtful."#;
