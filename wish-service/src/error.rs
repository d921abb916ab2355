use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use thiserror::Error;
use wedding_shared::models::ErrorResponse;
use wedding_shared::store::StoreError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Malformed request body: {0}")]
    MalformedRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Server configuration error")]
    Configuration,

    /// The store could not be reached, timed out, or refused the request.
    #[error("{message}: {detail}")]
    Upstream {
        message: &'static str,
        detail: String,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Classifies a store failure, using `message` as the client-facing text
    /// when the store itself answered with a failure. A store that never
    /// answered reads as a generic server error.
    pub fn from_store(err: StoreError, message: &'static str) -> Self {
        match err {
            StoreError::NotConfigured => AppError::Configuration,
            StoreError::Unreachable(detail) => AppError::Upstream {
                message: "Internal server error",
                detail,
            },
            StoreError::Rejected { status, detail } => AppError::Upstream {
                message,
                detail: format!("status {}: {}", status, detail),
            },
            StoreError::InvalidReply(detail) => AppError::Upstream { message, detail },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration | AppError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text sent to the browser. Upstream details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::MalformedRequest(_) => "Invalid JSON body".to_string(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::Configuration => "Server configuration error".to_string(),
            AppError::Upstream { message, .. } => message.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}
