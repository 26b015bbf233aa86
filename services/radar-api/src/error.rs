//! Mapping of service errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use radar_common::RadarError;
use serde_json::json;
use tracing::{error, warn};

/// A [`RadarError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub RadarError);

impl From<RadarError> for ApiError {
    fn from(err: RadarError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        let mut body = json!({
            "error": self.0.to_string(),
            "status": status.as_u16(),
        });
        if let Some(partial) = self.0.partial() {
            body["partial"] = partial.clone();
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
