use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::{Duration, Month, OffsetDateTime};
use tracing::{debug, instrument};

use super::calendar::{calendar_month, group_by_day, CalendarDay, DayGroup};
use super::report::{weekly_report, WeeklyReport};
use super::stats::{high_risk_insight, HighRiskInsight, RiskCounts, WEEK_DAYS};
use crate::{error::ApiError, state::AppState};

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/weekly", get(weekly))
        .route("/analytics/calendar", get(calendar))
        .route("/analytics/days", get(days))
        .route("/analytics/risk", get(risk_counts))
        .route("/analytics/insight", get(insight))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

#[instrument(skip(state))]
pub async fn weekly(State(state): State<AppState>) -> Result<Json<WeeklyReport>, ApiError> {
    let records = state.history.list().await?;
    let target = state
        .profiles
        .daily_target(state.config.default_target_calories)
        .await?;
    let report = weekly_report(
        &records,
        OffsetDateTime::now_utc(),
        state.config.utc_offset,
        target,
    );
    debug!(records = report.record_count, daily_target = target, "weekly report");
    Ok(Json(report))
}

/// Defaults to the current month in the configured offset.
#[instrument(skip(state))]
pub async fn calendar(
    State(state): State<AppState>,
    Query(q): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarDay>>, ApiError> {
    let today = OffsetDateTime::now_utc()
        .to_offset(state.config.utc_offset)
        .date();
    let year = q.year.unwrap_or(today.year());
    let month = match q.month {
        Some(m) => Month::try_from(m)
            .map_err(|_| ApiError::BadRequest("month must be 1-12".into()))?,
        None => today.month(),
    };
    let records = state.history.list().await?;
    let days = calendar_month(&records, year, month, state.config.utc_offset)
        .map_err(|e| ApiError::BadRequest(format!("invalid calendar month: {e}")))?;
    Ok(Json(days))
}

#[instrument(skip(state))]
pub async fn days(State(state): State<AppState>) -> Result<Json<Vec<DayGroup>>, ApiError> {
    let records = state.history.list().await?;
    Ok(Json(group_by_day(&records, state.config.utc_offset)))
}

#[instrument(skip(state))]
pub async fn risk_counts(State(state): State<AppState>) -> Result<Json<RiskCounts>, ApiError> {
    let records = state.history.list().await?;
    Ok(Json(RiskCounts::from_records(&records)))
}

#[instrument(skip(state))]
pub async fn insight(State(state): State<AppState>) -> Result<Json<HighRiskInsight>, ApiError> {
    let records = state.history.list().await?;
    let cutoff = OffsetDateTime::now_utc() - Duration::days(WEEK_DAYS);
    Ok(Json(high_risk_insight(&records, cutoff)))
}

#[cfg(test)]
mod handler_tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    async fn call(app: &axum::Router, req: Request<Body>) -> (u16, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status().as_u16();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_meal(app: &axum::Router, body: Value) {
        let req = Request::post("/api/v1/meals")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _) = call(app, req).await;
        assert_eq!(status, 201);
    }

    #[tokio::test]
    async fn weekly_report_uses_recent_meals() {
        let app = build_app(AppState::fake());
        post_meal(&app, json!({
            "input": "Tonkatsu, cabbage", "mealType": "Dinner", "risk": "High",
            "calories": 900, "protein": 35, "fat": 50, "carbohydrates": 60
        }))
        .await;
        post_meal(&app, json!({
            "input": "Tonkatsu", "mealType": "Lunch", "risk": "High", "calories": 800
        }))
        .await;

        let (status, report) = call(&app, Request::get("/api/v1/analytics/weekly").body(Body::empty()).unwrap()).await;
        assert_eq!(status, 200);
        assert_eq!(report["recordCount"], 2);
        assert_eq!(report["dailyTarget"], 2000.0);
        assert_eq!(report["days"].as_array().unwrap().len(), 7);
        assert_eq!(report["days"][6]["calories"], 1700.0);
        assert!(report["pfc"]["totalMacroCalories"].is_number());
        assert!(report.get("record_count").is_none());

        let (_, insight) = call(&app, Request::get("/api/v1/analytics/insight").body(Body::empty()).unwrap()).await;
        assert_eq!(insight["count"], 2);
        assert_eq!(insight["topItems"], json!(["Tonkatsu"]));

        let (_, risk) = call(&app, Request::get("/api/v1/analytics/risk").body(Body::empty()).unwrap()).await;
        assert_eq!(risk["high"], 2);
        assert_eq!(risk["total"], 2);
    }

    #[tokio::test]
    async fn calendar_validates_month() {
        let app = build_app(AppState::fake());
        let (status, body) = call(
            &app,
            Request::get("/api/v1/analytics/calendar?year=2024&month=13").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "month must be 1-12");

        let (status, body) = call(
            &app,
            Request::get("/api/v1/analytics/calendar?year=2024&month=2").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body.as_array().unwrap().len(), 29);
        assert_eq!(body[0]["recordCount"], 0);
        assert!(body[0]["worstRisk"].is_null());
    }

    #[tokio::test]
    async fn stored_far_future_record_does_not_break_views() {
        use std::sync::Arc;

        use crate::advice::gemini::GeminiAnalyzer;
        use crate::config::AppConfig;
        use crate::meals::repo::HISTORY_KEY;
        use crate::storage::{KvStore, MemoryStore};

        let config = Arc::new(AppConfig {
            utc_offset: time::macros::offset!(+9),
            ..AppConfig::for_tests()
        });
        let store = Arc::new(MemoryStore::default());
        store
            .put(
                HISTORY_KEY,
                json!([{
                    "id": "7d0f3c52-3b7e-4d4a-9a57-1f2b0c6a9e11",
                    "date": "9999-12-31T23:00:00Z",
                    "input": "Cake", "mealType": "Snack", "risk": "High", "calories": 400
                }])
                .to_string(),
            )
            .await
            .unwrap();
        let analyzer = Arc::new(GeminiAnalyzer::new(config.gemini.clone()));
        let app = build_app(AppState::from_parts(config, store, analyzer));

        for uri in [
            "/api/v1/analytics/weekly",
            "/api/v1/analytics/calendar?year=2024&month=2",
            "/api/v1/analytics/days",
            "/api/v1/meals?q=cake",
        ] {
            let (status, _) = call(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, 200, "{uri}");
        }
        let (_, days) = call(&app, Request::get("/api/v1/analytics/days").body(Body::empty()).unwrap()).await;
        assert_eq!(days, json!([]));
    }
}
