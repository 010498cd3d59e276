use std::{fmt, io};
use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::session::StoreError;

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    Io(io::Error),
    NotFound,
    InvalidPath,
    Render(String),
    Config(String),
    Session(StoreError),
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
            WikiError::NotFound => f.write_str("Not found"),
            WikiError::InvalidPath => f.write_str("Invalid path"),
            WikiError::Render(e) => write!(f, "Render error: {}", e),
            WikiError::Config(e) => write!(f, "Configuration error: {}", e),
            WikiError::Session(e) => write!(f, "Session error: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::Io(e) => Some(e),
            WikiError::Session(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Io(err)
    }
}

impl From<StoreError> for WikiError {
    fn from(err: StoreError) -> Self {
        WikiError::Session(err)
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        let status = match self {
            WikiError::NotFound => StatusCode::NOT_FOUND,
            WikiError::InvalidPath => StatusCode::BAD_REQUEST,
            WikiError::Io(_)
            | WikiError::Render(_)
            | WikiError::Config(_)
            | WikiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
