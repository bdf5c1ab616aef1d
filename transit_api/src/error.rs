use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use transit_tracker::error::TrackerError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServerError(String),
    NotFound(String),
    ServiceUnavailable(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::InternalServerError(error.to_string())
    }
}

impl From<TrackerError> for ApiError {
    fn from(error: TrackerError) -> Self {
        match error {
            TrackerError::InvalidRecord(_)
            | TrackerError::InvalidSpeed(_)
            | TrackerError::MissingSessionState(_) => ApiError::BadRequest(error.to_string()),
            TrackerError::PositionUnavailable(_) | TrackerError::StoreUnavailable(_) => {
                ApiError::ServiceUnavailable(error.to_string())
            }
            TrackerError::SessionStorage(_) => ApiError::InternalServerError(error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiError::ServiceUnavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, message).into_response()
            }
        }
    }
}
