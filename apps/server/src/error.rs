//! Error types for the payments server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finatech_models::ValidationFailure;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Error::Validation {
            message: failure.message,
            errors: failure.errors,
        }
    }
}

impl From<finatech_models::Error> for Error {
    fn from(err: finatech_models::Error) -> Self {
        match err {
            finatech_models::Error::InvalidPaging(message)
            | finatech_models::Error::InvalidFieldValue(message) => Error::InvalidArgument(message),
            other @ finatech_models::Error::UnknownChargesBearer(_) => {
                Error::Internal(other.to_string())
            }
        }
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation { .. } | Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_) | Error::Migration(_) | Error::Internal(_) | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Error::Validation { message, errors } => json!({
                "problemDetails": message,
                "errors": errors,
            }),
            Error::Database(_) | Error::Migration(_) => {
                tracing::error!(error = %self, "Database error");
                json!({ "problemDetails": "A database error occurred." })
            }
            Error::Internal(_) | Error::Other(_) => {
                tracing::error!(error = %self, "Internal error");
                json!({ "problemDetails": "An unexpected internal server error occurred." })
            }
            Error::InvalidArgument(message) | Error::NotFound(message) | Error::Conflict(message) => {
                json!({ "problemDetails": message })
            }
        };

        (status, Json(body)).into_response()
    }
}
