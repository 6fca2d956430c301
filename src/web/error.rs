use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::model::UpstreamError;
use crate::web::models::ErrorResponse;

const FALLBACK_MESSAGE: &str = "Server error calling Gemini API";

/// Everything the chat endpoint can fail with.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("message is required (string)")]
    MissingMessage,

    #[error("{message}")]
    Payload { status: StatusCode, message: String },

    #[error("{0}")]
    Context(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingMessage => StatusCode::BAD_REQUEST,
            RelayError::Payload { status, .. } => *status,
            RelayError::Context(_) | RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.client_message(),
        })
    }
}

impl From<actix_web::Error> for RelayError {
    fn from(err: actix_web::Error) -> Self {
        RelayError::Payload {
            status: err.as_response_error().status_code(),
            message: err.to_string(),
        }
    }
}

impl RelayError {
    /// Text reported to the caller, never empty.
    pub fn client_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}
