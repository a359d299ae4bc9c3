use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::CvProfile;
use crate::profile::extractor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadCvRequest {
    /// Plain résumé text. PDF/DOC extraction happens upstream.
    pub text: String,
}

/// POST /api/v1/cv
/// Extracts a profile from résumé text and installs it as the current one.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Json(request): Json<UploadCvRequest>,
) -> Result<Json<CvProfile>, AppError> {
    let profile = extractor::extract(&request.text, state.config.max_cv_length)?;

    info!(
        "Profile extracted: {} skills, seniority={}, industry={}, confidence={:.2}",
        profile.skills.len(),
        profile.seniority.as_str(),
        profile.primary_industry,
        profile.confidence
    );

    *state.profile.write().await = Some(Arc::new(profile.clone()));
    Ok(Json(profile))
}

/// GET /api/v1/cv
/// Returns the current profile, if any résumé has been uploaded.
pub async fn handle_get_cv(
    State(state): State<AppState>,
) -> Result<Json<CvProfile>, AppError> {
    let guard = state.profile.read().await;
    match guard.as_ref() {
        Some(profile) => Ok(Json(profile.as_ref().clone())),
        None => Err(AppError::NotFound(
            "No CV uploaded yet. POST résumé text to /api/v1/cv first.".to_string(),
        )),
    }
}
