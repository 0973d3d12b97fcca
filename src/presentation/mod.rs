// Presentation layer - HTTP surface for the external UI and renderer
pub mod app_state;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_chart, get_controls, health_check, list_topics, update_controls};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/topics", get(list_topics))
        .route("/chart", get(get_chart))
        .route("/controls", put(update_controls).get(get_controls))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
