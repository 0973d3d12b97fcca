// HTTP request handlers
use crate::application::controls::{Controls, ControlsUpdate};
use crate::domain::dashboard::RenderConfig;
use crate::domain::topic::Topic;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Topic catalog for the selectors
pub async fn list_topics(State(state): State<Arc<AppState>>) -> Json<Vec<Topic>> {
    Json(state.catalog.topics().to_vec())
}

/// Current chart as a declarative render config
pub async fn get_chart(State(state): State<Arc<AppState>>) -> Json<RenderConfig> {
    Json(state.poll_loop.render_config().await)
}

pub async fn get_controls(State(state): State<Arc<AppState>>) -> Json<Controls> {
    Json(state.poll_loop.controls().await)
}

/// Change selection, limit, stop or align flags; picked up by the next tick
pub async fn update_controls(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ControlsUpdate>,
) -> Result<Json<Controls>, ApiError> {
    let controls = state.poll_loop.update_controls(update).await?;
    tracing::info!(
        topics = ?controls.topics,
        limit = controls.limit.get(),
        stopped = controls.stopped,
        align_axes = controls.align_axes,
        "Controls updated"
    );
    Ok(Json(controls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_renderer::NoopRenderer;
    use crate::application::poll_loop::{PollLoop, PollSettings};
    use crate::application::series_fetcher::{FetchError, FetchRequest, RawBatch, SeriesFetcher};
    use crate::domain::topic::Catalog;
    use crate::presentation::router;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::num::NonZeroUsize;
    use std::time::Duration;
    use tower::ServiceExt;

    struct CannedFetcher;

    #[async_trait]
    impl SeriesFetcher for CannedFetcher {
        async fn fetch(&self, _request: &FetchRequest) -> Result<RawBatch, FetchError> {
            Ok(json!({"ecu/tps": [{"usec": 10, "value": 1.0}, {"usec": 20, "value": 3.0}]}))
        }
    }

    fn app_state() -> Arc<AppState> {
        let catalog = Arc::new(Catalog::builtin());
        let poll_loop = Arc::new(PollLoop::new(
            Arc::new(CannedFetcher),
            catalog.clone(),
            Arc::new(NoopRenderer),
            PollSettings {
                interval: Duration::from_millis(1000),
                fetch_timeout: Duration::from_millis(900),
            },
            Controls::new(vec![], NonZeroUsize::new(100).unwrap()).unwrap(),
        ));
        Arc::new(AppState { catalog, poll_loop })
    }

    async fn send(state: Arc<AppState>, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_list_topics() {
        let (status, body) = send(app_state(), Method::GET, "/topics", None).await;

        assert_eq!(status, StatusCode::OK);
        let values: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["value"].as_str())
            .collect();
        assert!(values.contains(&"temp"));
        assert!(values.contains(&"acc/gyro_z"));
    }

    #[tokio::test]
    async fn test_controls_then_tick_shows_in_chart() {
        let state = app_state();

        let (status, body) = send(
            state.clone(),
            Method::PUT,
            "/controls",
            Some(json!({"topics": ["ecu/tps"], "limit": 50})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["limit"], 50);

        // Nothing changes until the next tick
        let (_, chart) = send(state.clone(), Method::GET, "/chart", None).await;
        assert_eq!(chart["datasets"][0]["label"], "y0");

        state.poll_loop.tick().await;

        let (_, chart) = send(state, Method::GET, "/chart", None).await;
        assert_eq!(chart["datasets"].as_array().unwrap().len(), 3);
        assert_eq!(chart["datasets"][0]["label"], "TPS (V)");
        assert_eq!(chart["datasets"][0]["points"][1]["y"], 3.0);
        assert_eq!(chart["x_axis"]["min"], 10);
        assert_eq!(chart["x_axis"]["max"], 20);
        assert_eq!(chart["y_axes"][1]["active"], false);
        assert_eq!(chart["limit"], 50);
        assert!(chart["last_update"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_controls_are_rejected() {
        let state = app_state();

        let (status, body) = send(state.clone(), Method::PUT, "/controls", Some(json!({"limit": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("limit"));

        let (status, _) = send(
            state.clone(),
            Method::PUT,
            "/controls",
            Some(json!({"topics": ["a", "b", "c", "d"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, controls) = send(state, Method::GET, "/controls", None).await;
        assert_eq!(controls["limit"], 100);
    }
}
