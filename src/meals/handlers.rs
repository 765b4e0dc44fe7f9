use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{BulkDeleteRequest, BulkDeleteResponse, ListQuery, NewMeal, SaveAnalysisRequest};
use super::repo::UpdateError;
use super::repo_types::MealRecord;
use super::services::{matches_query, new_meal_from_analysis, resolve_date};
use crate::{analytics::stats::filter_by_risk, error::ApiError, state::AppState};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal).delete(clear_meals))
        .route("/meals/from-analysis", post(create_from_analysis))
        .route("/meals/bulk-delete", post(bulk_delete))
        .route(
            "/meals/:id",
            get(get_meal).patch(update_meal).delete(delete_meal),
        )
}

impl From<UpdateError> for ApiError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::NotFound => ApiError::NotFound("Meal not found".into()),
            UpdateError::Invalid(e) => ApiError::BadRequest(format!("invalid update: {e}")),
            UpdateError::DateOutOfRange => {
                ApiError::BadRequest(UpdateError::DateOutOfRange.to_string())
            }
            UpdateError::Store(e) => ApiError::Internal(e),
        }
    }
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<MealRecord>>, ApiError> {
    let records = state.history.list().await?;
    let records = match q.risk {
        Some(risk) => filter_by_risk(&records, risk).into_iter().cloned().collect(),
        None => records,
    };
    let offset = state.config.utc_offset;
    let items = match q.q.as_deref() {
        Some(query) => records
            .into_iter()
            .filter(|r| matches_query(r, query, offset))
            .collect(),
        None => records,
    };
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealRecord>, ApiError> {
    state
        .history
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))
}

async fn store_new_meal(
    state: &AppState,
    new: NewMeal,
) -> Result<(StatusCode, HeaderMap, Json<MealRecord>), ApiError> {
    if new.input.trim().is_empty() {
        return Err(ApiError::BadRequest("input is required".into()));
    }
    let date = resolve_date(
        new.date.as_deref(),
        state.config.utc_offset,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| {
        warn!(error = ?e, "bad custom date");
        ApiError::BadRequest(e.to_string())
    })?;

    let record = state.history.save(new, date).await?;
    info!(id = %record.id, meal_type = ?record.meal_type, "meal recorded");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meals/{}", record.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(record)))
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(body): Json<NewMeal>,
) -> Result<(StatusCode, HeaderMap, Json<MealRecord>), ApiError> {
    store_new_meal(&state, body).await
}

#[instrument(skip(state, body))]
pub async fn create_from_analysis(
    State(state): State<AppState>,
    Json(body): Json<SaveAnalysisRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealRecord>), ApiError> {
    let new = new_meal_from_analysis(body.item, body.meal_type, body.date);
    store_new_meal(&state, new).await
}

#[instrument(skip(state, patch))]
pub async fn update_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<MealRecord>, ApiError> {
    let Value::Object(patch) = patch else {
        return Err(ApiError::BadRequest("update must be a JSON object".into()));
    };
    let record = state.history.update(id, &patch, state.config.utc_offset).await?;
    info!(%id, fields = patch.len(), "meal updated");
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.history.delete(id).await? {
        info!(%id, "meal deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Meal not found".into()))
    }
}

#[instrument(skip(state, body))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    let deleted = state.history.delete_many(&body.ids).await?;
    info!(requested = body.ids.len(), deleted, "bulk delete");
    Ok(Json(BulkDeleteResponse { deleted }))
}

#[instrument(skip(state))]
pub async fn clear_meals(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.history.clear().await?;
    warn!("meal history cleared");
    Ok(StatusCode::NO_CONTENT)
}
