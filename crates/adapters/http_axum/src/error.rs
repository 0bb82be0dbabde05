//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use greencue_domain::error::{ErrorKind, GreenCueError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Maps [`GreenCueError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(GreenCueError);

impl<E: Into<GreenCueError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::Parse | ErrorKind::Validation | ErrorKind::Synthesis => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Transport => StatusCode::BAD_GATEWAY,
            ErrorKind::Persistence | ErrorKind::Orchestration => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status.is_server_error() {
            tracing::error!(kind = %kind, error = %self.0.detail(), "request failed");
            self.0.to_string()
        } else {
            self.0.detail()
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                kind: kind.code(),
            }),
        )
            .into_response()
    }
}
