use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jobs_api::ApiError;
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Everything a relay route can answer with besides the upstream payload. Every variant is
/// rendered as `{"message": ...}`.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    BadRequest(&'static str),
    /// The upstream call failed; `status` is the upstream status, if there was a response
    #[error("{message}")]
    Upstream {
        status: Option<StatusCode>,
        message: String,
    },
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Translates a failed upstream call. The upstream message is used when there is one,
    /// otherwise `fallback`.
    #[must_use]
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Fault { code, .. } => RelayError::Upstream {
                status: Some(*code),
                message: err.user_message(fallback),
            },
            ApiError::RequestError(e) => RelayError::Upstream {
                status: e.status(),
                message: fallback.to_string(),
            },
            ApiError::RequiredParameter(_)
            | ApiError::SerializationError(_)
            | ApiError::ParseError(_) => RelayError::Internal(err.to_string()),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } => {
                status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            RelayError::BadRequest(message) => (*message).to_string(),
            RelayError::Upstream { message, .. } => {
                warn!("Upstream call failed ({status}): {message}");
                message.clone()
            }
            RelayError::Internal(reason) => {
                error!("Relay failure: {reason}");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
