mod config;
mod errors;
mod generation;
mod matcher;
mod models;
mod pipeline;
mod profile;
mod routes;
mod scrape;
mod sources;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::generator::CoverLetterGenerator;
use crate::routes::build_router;
use crate::sources::build_registry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on invalid values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobhunt API v{}", env!("CARGO_PKG_VERSION"));

    // Source adapter registry (credentialed adapters join only when configured)
    let registry = build_registry(&config)?;
    info!(
        "Source registry initialized: [{}]",
        registry.iter().map(|s| s.id()).collect::<Vec<_>>().join(", ")
    );

    // Cover-letter generator with the process-wide rate-limit bucket
    let generator = CoverLetterGenerator::from_config(&config)?;
    info!("Cover-letter generator initialized");

    // Build app state
    let state = AppState {
        profile: Arc::new(RwLock::new(None)),
        sources: Arc::new(registry),
        generator: Arc::new(generator),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
