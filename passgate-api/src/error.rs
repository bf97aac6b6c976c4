/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`. Authentication failures never reach a
/// handler: the strategy guard renders them itself. What is left here is
/// server-side and becomes a 500 with the `INTERNAL` code and no internal
/// detail in the body.
///
/// # Example
///
/// ```
/// use passgate_api::error::{ApiError, ApiResult};
///
/// fn handler() -> ApiResult<&'static str> {
///     Err(ApiError::Internal("token store unavailable".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use passgate_shared::auth::jwt::JwtError;
use passgate_shared::error::{ErrorBody, ErrorCode};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Internal server error (500)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                let body = Json(ErrorBody {
                    code: ErrorCode::Internal,
                    message: "An internal error occurred".to_string(),
                    fields: Vec::new(),
                });

                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Minting failures are server-side: the caller already authenticated
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Internal(format!("Token operation failed: {}", err))
    }
}
