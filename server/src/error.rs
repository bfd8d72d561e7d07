use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Error surface of the HTTP handlers. Store failures all land here and
/// render as a 500 with the underlying message in the body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
