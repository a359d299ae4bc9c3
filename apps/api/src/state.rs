use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::generation::generator::CoverLetterGenerator;
use crate::models::profile::CvProfile;
use crate::sources::JobSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Profile from the most recent résumé upload. A re-upload swaps the
    /// `Arc`; profiles are never mutated in place.
    pub profile: Arc<RwLock<Option<Arc<CvProfile>>>>,
    /// Source adapter registry, capability-checked once at startup.
    pub sources: Arc<Vec<Arc<dyn JobSource>>>,
    /// Cover-letter generator. Holds the token bucket shared by every
    /// generation call in the process.
    pub generator: Arc<CoverLetterGenerator>,
}
