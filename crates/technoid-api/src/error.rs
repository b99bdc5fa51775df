use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use technoid_db::DbError;
use technoid_types::api::ErrorResponse;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, email, and message are required.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Name, email, and message are required.")]
    Validation { missing: Vec<&'static str> },

    #[error("{0}")]
    MalformedBody(String),

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    /// Store failure. `public` is what the caller sees; `source` is only logged.
    #[error("{public}")]
    Persistence {
        public: &'static str,
        #[source]
        source: DbError,
    },

    #[error("{0}")]
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation { .. } | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Persistence { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if let ApiError::Persistence { public, source } = &self {
            error!(error = %source, "Database error: {}", public);
        }

        let mut body = ErrorResponse::new(self.to_string());
        if let ApiError::Validation { missing } = self {
            body.missing = missing.into_iter().map(String::from).collect();
        }

        (status, Json(body)).into_response()
    }
}
