//! Fixed skill vocabulary and industry clusters driving profile extraction.
//!
//! Every table is lower-case; callers scan lower-cased résumé text with
//! case-insensitive substring semantics. Table order is significant: it
//! decides skill ordering in the profile and breaks industry-score ties.

/// One industry cluster: the keywords that indicate it, the job sources
/// queried first when it is the primary industry, and the search terms used
/// for discovery.
#[derive(Debug, Clone, Copy)]
pub struct Industry {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub preferred_sources: &'static [&'static str],
    pub search_terms: &'static [&'static str],
}

pub const INDUSTRIES: &[Industry] = &[
    Industry {
        name: "web3",
        keywords: &[
            "web3",
            "blockchain",
            "defi",
            "solidity",
            "smart contract",
            "ethereum",
            "dapp",
            "liquidation",
            "mev",
            "tokenomics",
        ],
        preferred_sources: &["remoteok", "arbeitnow", "adzuna"],
        search_terms: &["web3", "blockchain", "solidity"],
    },
    Industry {
        name: "devops_cloud",
        keywords: &[
            "devops",
            "devsecops",
            "aws",
            "azure",
            "kubernetes",
            "docker",
            "terraform",
            "ci/cd",
            "jenkins",
            "gitops",
            "monitoring",
        ],
        preferred_sources: &["remoteok", "adzuna", "arbeitnow"],
        search_terms: &["devops", "cloud engineer", "kubernetes"],
    },
    Industry {
        name: "backend",
        keywords: &[
            "python",
            "java",
            "javascript",
            "typescript",
            "node.js",
            "rust",
            "golang",
            "backend",
            "microservices",
            "postgresql",
            "rest api",
            "graphql",
        ],
        preferred_sources: &["arbeitnow", "remoteok", "adzuna"],
        search_terms: &["backend engineer", "software engineer"],
    },
    Industry {
        name: "cybersecurity",
        keywords: &[
            "cyber security",
            "ethical hacking",
            "penetration testing",
            "network security",
            "security analyst",
            "vulnerability",
            "compliance",
            "firewall",
        ],
        preferred_sources: &["adzuna", "remoteok", "arbeitnow"],
        search_terms: &["security analyst", "penetration testing"],
    },
    Industry {
        name: "data_ml",
        keywords: &[
            "machine learning",
            "data science",
            "pytorch",
            "tensorflow",
            "pandas",
            "data engineering",
            "etl",
            "analytics",
        ],
        preferred_sources: &["remoteok", "arbeitnow", "adzuna"],
        search_terms: &["machine learning", "data scientist"],
    },
    Industry {
        name: "content_marketing",
        keywords: &[
            "content writing",
            "digital marketing",
            "seo",
            "copywriting",
            "social media",
            "email marketing",
        ],
        preferred_sources: &["adzuna", "arbeitnow", "remoteok"],
        search_terms: &["content writer", "digital marketing"],
    },
];

/// Industry name used when no cluster matches.
pub const GENERAL_INDUSTRY: &str = "general";

/// Technology tokens matched in addition to the industry keywords.
/// Kept at three characters or longer so substring matching stays sane.
pub const EXTRA_SKILLS: &[&str] = &[
    "c++",
    "c#",
    "ruby",
    "php",
    "react",
    "angular",
    "vue",
    "django",
    "flask",
    "spring",
    "express",
    "laravel",
    "fastapi",
    "gcp",
    "mysql",
    "mongodb",
    "redis",
    "elasticsearch",
    "kafka",
    "git",
    "linux",
    "html",
    "css",
    "sql",
];

/// Indicators checked in priority order: senior terms beat junior terms,
/// and anything else defaults to mid.
pub const SENIOR_INDICATORS: &[&str] = &[
    "senior",
    "lead",
    "principal",
    "staff",
    "architect",
    "head of",
    "director",
    "chief",
    "expert",
    "specialist",
];

pub const JUNIOR_INDICATORS: &[&str] = &[
    "junior",
    "graduate",
    "intern",
    "entry level",
    "trainee",
    "apprentice",
];

/// Claimed years of experience at or above this count as a senior indicator.
pub const SENIOR_YEARS: u32 = 6;

/// Full skill vocabulary in deterministic order: industry keywords first
/// (table order), then the extra technology tokens, duplicates removed.
pub fn skill_vocabulary() -> Vec<&'static str> {
    let mut seen = std::collections::HashSet::new();
    let mut vocab = Vec::new();
    for industry in INDUSTRIES {
        for &keyword in industry.keywords {
            if seen.insert(keyword) {
                vocab.push(keyword);
            }
        }
    }
    for &skill in EXTRA_SKILLS {
        if seen.insert(skill) {
            vocab.push(skill);
        }
    }
    vocab
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_has_no_duplicates() {
        let vocab = skill_vocabulary();
        let unique: std::collections::HashSet<_> = vocab.iter().collect();
        assert_eq!(vocab.len(), unique.len());
    }

    #[test]
    fn test_vocabulary_is_lowercase() {
        for token in skill_vocabulary() {
            assert_eq!(token, token.to_lowercase(), "vocabulary token '{token}' not lowercase");
        }
    }

    #[test]
    fn test_industry_keywords_come_first() {
        let vocab = skill_vocabulary();
        assert_eq!(vocab[0], INDUSTRIES[0].keywords[0]);
    }

    #[test]
    fn test_every_industry_names_known_sources() {
        for industry in INDUSTRIES {
            for source in industry.preferred_sources {
                assert!(
                    ["remoteok", "arbeitnow", "adzuna"].contains(source),
                    "industry {} references unknown source {}",
                    industry.name,
                    source
                );
            }
        }
    }
}
