use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{AdviceRequest, AdviceResponse, ModelsResponse};
use super::services::analyze_meal;
use crate::{error::ApiError, state::AppState};

/// Photos arrive base64-encoded inside the JSON body.
const ADVICE_BODY_LIMIT: usize = 20 * 1024 * 1024;

pub fn advice_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/advice",
            post(advise).layer(DefaultBodyLimit::max(ADVICE_BODY_LIMIT)),
        )
        .route("/models", get(list_models))
}

#[instrument(skip(state, body), fields(has_image = body.image.is_some()))]
pub async fn advise(
    State(state): State<AppState>,
    Json(body): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, ApiError> {
    let result = analyze_meal(
        state.analyzer.as_ref(),
        &state.config.gemini.default_model,
        body,
    )
    .await?;
    Ok(Json(AdviceResponse { result }))
}

#[instrument(skip(state))]
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, ApiError> {
    let models = state.analyzer.list_models().await?;
    Ok(Json(ModelsResponse { models }))
}
