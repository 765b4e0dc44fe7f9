use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument, warn};

use super::dto::{ProfileInput, ProfileResponse};
use super::services::{build_profile, validate};
use crate::{error::ApiError, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profiles.get().await?;
    Ok(Json(ProfileResponse::new(
        profile,
        state.config.default_target_calories,
    )))
}

#[instrument(skip(state, body))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(body): Json<ProfileInput>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if let Err(msg) = validate(&body) {
        warn!(%msg, "invalid profile");
        return Err(ApiError::BadRequest(msg));
    }
    let profile = build_profile(body);
    state.profiles.save(&profile).await?;
    info!(
        target_calories = profile.target_calories,
        custom = profile.has_custom_target(),
        "profile saved"
    );
    Ok(Json(ProfileResponse::new(
        Some(profile),
        state.config.default_target_calories,
    )))
}
