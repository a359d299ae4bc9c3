use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::matcher::MatchWeights;
use crate::pipeline::{run_discovery, DiscoveryReport, RunOverrides};
use crate::state::AppState;

/// POST /api/v1/discover
/// Runs one full discovery pipeline for the current profile. The body is
/// optional; any field present overrides its config default for this run.
pub async fn handle_discover(
    State(state): State<AppState>,
    body: Option<Json<RunOverrides>>,
) -> Result<Json<DiscoveryReport>, AppError> {
    let profile = state.profile.read().await.clone().ok_or_else(|| {
        AppError::NotFound(
            "No CV uploaded yet. POST résumé text to /api/v1/cv first.".to_string(),
        )
    })?;

    let overrides = body.map(|Json(b)| b).unwrap_or_default();
    let report = run_discovery(
        &profile,
        &state.sources,
        &state.generator,
        &MatchWeights::default(),
        &state.config,
        overrides,
    )
    .await?;

    Ok(Json(report))
}
