/// Authentication endpoints
///
/// Each endpoint sits behind one strategy guard; by the time a handler runs
/// the request carries an [`AuthenticatedUser`].
///
/// # Endpoints
///
/// - `POST /v1/auth/login` - `local`: exchange login/password for a token pair
/// - `POST /v1/auth/refresh` - `refresh_jwt`: exchange a refresh token for a new pair
/// - `GET /v1/auth/me` - `jwt`: identity behind an access token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use passgate_shared::auth::{identity::Identity, middleware::AuthenticatedUser};
use serde::{Deserialize, Serialize};

/// Token pair response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Authenticated identity
    pub user: Identity,

    /// Access token (3h by default)
    pub access_token: String,

    /// Refresh token (7d by default)
    pub refresh_token: String,
}

fn issue_pair(state: &AppState, user: Identity) -> ApiResult<Json<TokenResponse>> {
    let access_token = state.codec().mint_access_token(&user)?;
    let refresh_token = state.codec().mint_refresh_token(&user)?;

    Ok(Json(TokenResponse {
        user,
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "login": "alice",
///   "password": "wonderland"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": "u1", "login": "alice" },
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized` / `INVALID_ARGUMENTS`: Wrong login or password
/// - `401 Unauthorized` / `INVALID_AUTH`: Missing credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<TokenResponse>> {
    tracing::info!(user_id = %user.id, "User logged in");
    issue_pair(&state, user)
}

/// Token refresh endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/refresh
/// Authorization: Bearer <refresh token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized` / `INVALID_AUTH_TOKEN`: Access token presented, or unknown user
/// - `401 Unauthorized` / `INVALID_AUTH`: Missing, malformed or expired token
pub async fn refresh(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<TokenResponse>> {
    issue_pair(&state, user)
}

/// Current identity
///
/// ```text
/// GET /v1/auth/me
/// Authorization: Bearer <access token>
/// ```
pub async fn me(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> Json<Identity> {
    Json(user)
}
