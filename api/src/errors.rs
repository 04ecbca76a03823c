use crate::db::DbError;
use hyper::StatusCode;
use projects::RegistryError;
use thiserror::Error;

/// Errors that can occur while handling an API request.
///
/// The `Display` output of each variant is exactly the message returned to the
/// client in the `{"error": ...}` body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Decode(String),

    #[error("API '{api}' 'payload' section empty or missing")]
    EmptyPayload { api: &'static str },

    #[error("API '{api}' missing '{field}' field in 'payload' section")]
    MissingField {
        api: &'static str,
        field: &'static str,
    },

    #[error("API '{api}' 'payload' '{field}' field '{value}' is not a string")]
    NotAString {
        api: &'static str,
        field: &'static str,
        value: serde_json::Value,
    },

    #[error(transparent)]
    ProjectNotFound(#[from] RegistryError),

    #[error("unknown API '{0}'")]
    UnknownApi(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Response serialization error: {0}")]
    ResponseSerialization(#[from] serde_json::Error),

    #[error("not found")]
    NotFound,

    #[error("method not allowed, use POST")]
    MethodNotAllowed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Every request error is reported as a client error, including backend
    /// failures.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
