/// Classified authentication failures
///
/// Strategy outcomes end up as one of two things:
///
/// - [`AuthFailure`]: a client-visible failure with an HTTP status, a
///   machine-readable [`ErrorCode`], a message and optionally the offending
///   request fields.
/// - A hard error (`anyhow::Error`) raised by the user directory, propagated
///   unchanged to the generic error boundary.
///
/// [`AuthError`] carries either one and renders as an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "code": "INVALID_ARGUMENTS",
///   "message": "Invalid login or password",
///   "fields": ["login", "password"]
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request arguments were rejected (wrong login or password)
    InvalidArguments,

    /// Token decoded but was refused (wrong flavor, unknown identity)
    InvalidAuthToken,

    /// Authentication could not be evaluated (no token, undecodable token)
    InvalidAuth,

    /// Server-side failure
    Internal,
}

impl ErrorCode {
    /// Gets error code as string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorCode::InvalidAuthToken => "INVALID_AUTH_TOKEN",
            ErrorCode::InvalidAuth => "INVALID_AUTH",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-visible authentication failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// HTTP status (401 for rejections, 500 for setup failures)
    pub status: StatusCode,

    /// Error code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Offending request fields, if any
    pub fields: Vec<String>,
}

impl AuthFailure {
    /// Creates a failure without field references
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// 401 failure
    pub fn unauthorized(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 500 failure with the `INTERNAL` code
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal, message)
    }

    /// Attaches offending field names
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status.as_u16(), self.message)
    }
}

impl std::error::Error for AuthFailure {}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Offending request fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Result of running an authentication strategy that did not succeed
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Classified, client-visible failure
    #[error("{0}")]
    Rejected(AuthFailure),

    /// Unrecoverable failure, propagated unchanged
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// The classified failure, if this is a rejection
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            AuthError::Rejected(failure) => Some(failure),
            AuthError::Internal(_) => None,
        }
    }

    /// HTTP status this error renders with
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Rejected(failure) => failure.status,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthFailure> for AuthError {
    fn from(failure: AuthFailure) -> Self {
        AuthError::Rejected(failure)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let failure = match self {
            AuthError::Rejected(failure) => failure,
            AuthError::Internal(err) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = ?err, "Authentication aborted by internal error");
                AuthFailure::internal("An internal error occurred")
            }
        };

        let body = Json(ErrorBody {
            code: failure.code,
            message: failure.message,
            fields: failure.fields,
        });

        (failure.status, body).into_response()
    }
}
