//! Request failures.
//!
//! Every failure is reported to the caller as `"<status text> : <detail>"`.
//! API Gateway pattern-matches that message to pick the response status, so
//! the text before ` : ` must stay the canonical HTTP reason phrase.

use http::StatusCode;
use thiserror::Error;

/// Errors that end an invocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrudError {
    /// Read found no record for the key.
    #[error("Not Found : {0}")]
    NotFound(String),
    /// Create targeted a key that already exists.
    #[error("Conflict : {0}")]
    Conflict(String),
    /// Update body carried no whitelisted field.
    #[error("Bad Request : {0}")]
    BadRequest(String),
    /// Unexpected store failure or unrecognized operation.
    #[error("Internal Server Error : {0}")]
    ServerError(String),
}

impl CrudError {
    /// The HTTP status the gateway is expected to answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::NotFound(_) => StatusCode::NOT_FOUND,
            CrudError::Conflict(_) => StatusCode::CONFLICT,
            CrudError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CrudError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
