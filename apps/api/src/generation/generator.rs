//! Cover-letter generation driven by an explicit per-request state machine:
//!
//! `Pending → (RateLimited → wait) → Requested → {Succeeded | Failed}` with
//! `Failed → TemplateFallback` as the terminal safety net.
//!
//! The generator never returns an error. Every degraded path ends in the
//! template and the method tag records which path produced the text.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::generation::client::{CohereClient, GenerationBackend, GenerationError};
use crate::generation::prompts::COVER_LETTER_PROMPT_TEMPLATE;
use crate::generation::rate_limit::TokenBucket;
use crate::generation::template;
use crate::models::posting::JobPosting;
use crate::models::profile::CvProfile;
use crate::models::report::{GeneratedLetter, GenerationMethod};

/// Non-rate-limit service errors are retried this many times.
const MAX_RETRIES: u32 = 1;
/// Base backoff before a retry; doubles per attempt.
const BACKOFF_BASE_MS: u64 = 1000;
/// Description characters included in the prompt.
const PROMPT_DESCRIPTION_MAX: usize = 1200;
/// Skills quoted in the candidate summary.
const PROMPT_SKILLS: usize = 6;

/// One request's position in the state machine.
enum Step {
    Pending,
    RateLimited,
    Requested { attempt: u32 },
    Succeeded { text: String },
    Failed { error: GenerationError },
    TemplateFallback,
}

pub struct CoverLetterGenerator {
    /// `None` is template-only mode, selected at construction when no API
    /// key is configured.
    backend: Option<Arc<dyn GenerationBackend>>,
    /// Shared across every generation call in the process.
    bucket: TokenBucket,
    wait_ceiling: Duration,
}

impl CoverLetterGenerator {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend: Option<Arc<dyn GenerationBackend>> = match &config.cohere_api_key {
            Some(key) => Some(Arc::new(CohereClient::new(
                key.clone(),
                config.http_timeout_secs,
            )?)),
            None => {
                warn!("COHERE_API_KEY not set; cover letters will use the template path only");
                None
            }
        };

        Ok(Self::new(
            backend,
            TokenBucket::new(
                config.generation_calls_per_interval,
                Duration::from_secs(config.generation_refill_secs),
            ),
            Duration::from_secs(config.generation_wait_ceiling_secs),
        ))
    }

    pub fn new(
        backend: Option<Arc<dyn GenerationBackend>>,
        bucket: TokenBucket,
        wait_ceiling: Duration,
    ) -> Self {
        Self {
            backend,
            bucket,
            wait_ceiling,
        }
    }

    /// Generates a letter for one posting. Infallible by contract.
    pub async fn generate(&self, profile: &CvProfile, posting: &JobPosting) -> GeneratedLetter {
        let Some(backend) = &self.backend else {
            return self.fallback(profile, posting);
        };

        let prompt = build_prompt(profile, posting);
        let mut step = Step::Pending;

        loop {
            step = match step {
                Step::Pending => {
                    if self.bucket.try_acquire().await {
                        Step::Requested { attempt: 0 }
                    } else {
                        debug!("generation throttled for '{}'", posting.title);
                        Step::RateLimited
                    }
                }
                Step::RateLimited => {
                    if self.bucket.acquire(self.wait_ceiling).await {
                        Step::Requested { attempt: 0 }
                    } else {
                        warn!(
                            "generation wait ceiling exceeded for '{}'; using template",
                            posting.title
                        );
                        Step::TemplateFallback
                    }
                }
                Step::Requested { attempt } => match backend.generate(&prompt).await {
                    Ok(text) => Step::Succeeded { text },
                    Err(error) if attempt < MAX_RETRIES => {
                        let delay = Duration::from_millis(BACKOFF_BASE_MS << attempt);
                        warn!("generation call failed ({error}); retrying after {delay:?}");
                        tokio::time::sleep(delay).await;
                        Step::Requested {
                            attempt: attempt + 1,
                        }
                    }
                    Err(error) => Step::Failed { error },
                },
                Step::Succeeded { text } => {
                    return GeneratedLetter {
                        text,
                        method: GenerationMethod::Api,
                    };
                }
                Step::Failed { error } => {
                    warn!(
                        "generation failed after retry for '{}': {error}; using template",
                        posting.title
                    );
                    Step::TemplateFallback
                }
                Step::TemplateFallback => return self.fallback(profile, posting),
            };
        }
    }

    fn fallback(&self, profile: &CvProfile, posting: &JobPosting) -> GeneratedLetter {
        GeneratedLetter {
            text: template::render(profile, posting),
            method: GenerationMethod::Template,
        }
    }
}

/// Fills the prompt template from the profile and posting.
fn build_prompt(profile: &CvProfile, posting: &JobPosting) -> String {
    let skills = profile
        .skills
        .iter()
        .take(PROMPT_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let skills = if skills.is_empty() {
        "general professional work".to_string()
    } else {
        skills
    };
    let description: String = posting.description.chars().take(PROMPT_DESCRIPTION_MAX).collect();

    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{job_title}", &posting.title)
        .replace("{company}", &posting.company)
        .replace("{description}", &description)
        .replace("{skills}", &skills)
        .replace("{seniority}", profile.seniority.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Seniority;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;
    use uuid::Uuid;

    fn profile() -> CvProfile {
        CvProfile {
            id: Uuid::new_v4(),
            skills: vec!["python".to_string(), "aws".to_string()],
            seniority: Seniority::Senior,
            primary_industry: "devops_cloud".to_string(),
            keywords: vec![],
            confidence: 0.8,
            truncated: false,
            analyzed_at: Utc::now(),
        }
    }

    fn posting(title: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: "Acme Ltd".to_string(),
            location: "Remote".to_string(),
            salary: None,
            description: "Build cloud infrastructure".to_string(),
            tags: vec![],
            source: "remoteok".to_string(),
            url: "https://example.com/1".to_string(),
            contact_email: None,
            posted_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            external_id: Some("1".to_string()),
            scraped_at: Utc::now(),
        }
    }

    struct OkBackend {
        calls: AtomicU32,
        call_times: Mutex<Vec<Instant>>,
    }

    impl OkBackend {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                call_times: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for OkBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());
            Ok("Generated letter body".to_string())
        }
    }

    struct FailBackend {
        calls: AtomicU32,
    }

    #[async_trait]
    impl GenerationBackend for FailBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct FlakyBackend {
        calls: AtomicU32,
    }

    #[async_trait]
    impl GenerationBackend for FlakyBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(GenerationError::EmptyContent)
            } else {
                Ok("Recovered letter body".to_string())
            }
        }
    }

    fn generator(
        backend: Option<Arc<dyn GenerationBackend>>,
        capacity: u32,
        interval_secs: u64,
        ceiling_secs: u64,
    ) -> CoverLetterGenerator {
        CoverLetterGenerator::new(
            backend,
            TokenBucket::new(capacity, Duration::from_secs(interval_secs)),
            Duration::from_secs(ceiling_secs),
        )
    }

    #[tokio::test]
    async fn test_template_only_mode_without_backend() {
        let generator = generator(None, 10, 60, 30);
        let letter = generator.generate(&profile(), &posting("Platform Engineer")).await;
        assert_eq!(letter.method, GenerationMethod::Template);
        assert!(letter.text.contains("Platform Engineer"));
    }

    #[tokio::test]
    async fn test_successful_call_is_tagged_api() {
        let backend = Arc::new(OkBackend::new());
        let generator = generator(Some(backend.clone()), 10, 60, 30);
        let letter = generator.generate(&profile(), &posting("Cloud Engineer")).await;
        assert_eq!(letter.method, GenerationMethod::Api);
        assert_eq!(letter.text, "Generated letter body");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_retries_once_then_templates() {
        let backend = Arc::new(FailBackend {
            calls: AtomicU32::new(0),
        });
        let generator = generator(Some(backend.clone()), 10, 60, 30);
        let letter = generator.generate(&profile(), &posting("Data Engineer")).await;

        assert_eq!(letter.method, GenerationMethod::Template);
        assert!(!letter.text.is_empty());
        // Initial attempt plus exactly one retry.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_transient_failure() {
        let backend = Arc::new(FlakyBackend {
            calls: AtomicU32::new(0),
        });
        let generator = generator(Some(backend.clone()), 10, 60, 30);
        let letter = generator.generate(&profile(), &posting("Backend Engineer")).await;

        assert_eq!(letter.method, GenerationMethod::Api);
        assert_eq!(letter.text, "Recovered letter body");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ceiling_exceeded_skips_the_external_call() {
        let backend = Arc::new(OkBackend::new());
        // Capacity 1 with a 60s refill but only a 5s ceiling: the second
        // request cannot wait long enough and must template out.
        let generator = generator(Some(backend.clone()), 1, 60, 5);

        let first = generator.generate(&profile(), &posting("First")).await;
        let second = generator.generate(&profile(), &posting("Second")).await;

        assert_eq!(first.method, GenerationMethod::Api);
        assert_eq!(second.method, GenerationMethod::Template);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_never_call_simultaneously() {
        let backend = Arc::new(OkBackend::new());
        let interval = Duration::from_secs(60);
        let generator = Arc::new(generator(Some(backend.clone()), 1, 60, 600));

        let a = tokio::spawn({
            let generator = generator.clone();
            async move { generator.generate(&profile(), &posting("A")).await }
        });
        let b = tokio::spawn({
            let generator = generator.clone();
            async move { generator.generate(&profile(), &posting("B")).await }
        });

        let a = a.await.unwrap();
        let b = b.await.unwrap();
        assert_eq!(a.method, GenerationMethod::Api);
        assert_eq!(b.method, GenerationMethod::Api);

        let times = backend.call_times.lock().unwrap();
        assert_eq!(times.len(), 2);
        let gap = times[1].duration_since(times[0]);
        assert!(
            gap >= interval,
            "second external call fired after only {gap:?}"
        );
    }

    #[test]
    fn test_prompt_includes_posting_and_profile_facts() {
        let prompt = build_prompt(&profile(), &posting("Cloud Engineer"));
        assert!(prompt.contains("Cloud Engineer"));
        assert!(prompt.contains("Acme Ltd"));
        assert!(prompt.contains("python, aws"));
        assert!(prompt.contains("senior-level"));
        assert!(!prompt.contains("{job_title}"), "placeholders must all be filled");
    }
}
