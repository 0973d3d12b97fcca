// API error mapped onto HTTP responses
use crate::application::controls::ControlsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid controls: {0}")]
    InvalidControls(#[from] ControlsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidControls(_) => StatusCode::BAD_REQUEST,
        };

        tracing::debug!(error = %self, "Rejecting request");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
