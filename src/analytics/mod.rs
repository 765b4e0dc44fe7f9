pub mod calendar;
pub mod handlers;
pub mod report;
pub mod stats;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::analytics_routes()
}
