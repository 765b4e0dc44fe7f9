pub mod dto;
pub mod gemini;
pub mod handlers;
pub mod prompt;
pub mod services;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::advice_routes()
}
