use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every pipeline tunable lives here; stages receive values read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,

    /// Cohere API key for cover-letter generation. When absent the generator
    /// runs in template-only mode instead of failing at startup.
    pub cohere_api_key: Option<String>,
    /// Adzuna credentials. The Adzuna adapter is only registered when both
    /// are present.
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,

    /// Résumé text beyond this many characters is head-truncated before
    /// analysis.
    pub max_cv_length: usize,
    /// Minimum profile confidence required before discovery proceeds.
    pub confidence_floor: f64,

    pub max_jobs: usize,
    pub max_pages_per_source: usize,
    pub max_concurrent_sources: usize,

    /// How many top-ranked matches receive a generated cover letter.
    pub top_n: usize,
    /// Matches scoring below this never reach the generation stage.
    pub min_match_score: f64,

    /// Token-bucket parameters for the generation service.
    pub generation_calls_per_interval: u32,
    pub generation_refill_secs: u64,
    /// How long a generation request may wait on the bucket before it falls
    /// back to the template path.
    pub generation_wait_ceiling_secs: u64,

    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: env_parse("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cohere_api_key: env_opt("COHERE_API_KEY"),
            adzuna_app_id: env_opt("ADZUNA_APP_ID"),
            adzuna_app_key: env_opt("ADZUNA_APP_KEY"),
            max_cv_length: env_parse("MAX_CV_LENGTH", 20_000)?,
            confidence_floor: env_parse("CONFIDENCE_FLOOR", 0.2)?,
            max_jobs: env_parse("MAX_JOBS", 50)?,
            max_pages_per_source: env_parse("MAX_PAGES_PER_SOURCE", 3)?,
            max_concurrent_sources: env_parse("MAX_CONCURRENT_SOURCES", 4)?,
            top_n: env_parse("TOP_N", 10)?,
            min_match_score: env_parse("MIN_MATCH_SCORE", 0.1)?,
            generation_calls_per_interval: env_parse("GENERATION_CALLS_PER_INTERVAL", 10)?,
            generation_refill_secs: env_parse("GENERATION_REFILL_SECS", 60)?,
            generation_wait_ceiling_secs: env_parse("GENERATION_WAIT_CEILING_SECS", 30)?,
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS", 30)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Invalid configuration is a startup error, never a per-request one.
    fn validate(&self) -> Result<()> {
        if self.max_jobs == 0 {
            bail!("MAX_JOBS must be at least 1");
        }
        if self.max_pages_per_source == 0 {
            bail!("MAX_PAGES_PER_SOURCE must be at least 1");
        }
        if self.max_concurrent_sources == 0 {
            bail!("MAX_CONCURRENT_SOURCES must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            bail!("CONFIDENCE_FLOOR must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.min_match_score) {
            bail!("MIN_MATCH_SCORE must lie in [0, 1]");
        }
        if self.generation_calls_per_interval == 0 {
            bail!("GENERATION_CALLS_PER_INTERVAL must be at least 1");
        }
        if self.generation_refill_secs == 0 {
            bail!("GENERATION_REFILL_SECS must be at least 1");
        }
        Ok(())
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
