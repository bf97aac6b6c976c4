/// Strategy dispatcher
///
/// Runs a named strategy and turns its [`AuthOutcome`] into either an
/// authenticated request context or an [`AuthError`]:
///
/// ```text
/// Unauthenticated ──► Authenticated(identity)      identity stored on the context
///                 ├─► Rejected(AuthFailure)        classified 401/500, handler skipped
///                 └─► Errored(anyhow::Error)       re-raised unchanged
/// ```
///
/// Every state is terminal for the request; nothing is kept across requests.

use std::collections::HashMap;
use std::sync::Arc;

use super::bearer::BearerStrategy;
use super::identity::{Identity, RequestContext};
use super::jwt::TokenCodec;
use super::local::LocalStrategy;
use super::strategy::{
    AuthOutcome, Credentials, Strategy, StrategyName, TokenRejection, PASSWORD_FIELD, USERNAME_FIELD,
};
use crate::error::{AuthError, AuthFailure, ErrorCode};

/// Holds the three strategies and dispatches by name
#[derive(Clone)]
pub struct Dispatcher {
    strategies: HashMap<StrategyName, Arc<dyn Strategy>>,
}

impl Dispatcher {
    /// Builds `local`, `jwt` and `refresh_jwt` around a shared codec
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        let strategies: [Arc<dyn Strategy>; 3] = [
            Arc::new(LocalStrategy::new()),
            Arc::new(BearerStrategy::access(codec.clone())),
            Arc::new(BearerStrategy::refresh(codec)),
        ];

        Self {
            strategies: strategies
                .into_iter()
                .map(|strategy| (strategy.name(), strategy))
                .collect(),
        }
    }

    /// Strategy registered under `name`
    pub fn strategy(&self, name: StrategyName) -> Option<&Arc<dyn Strategy>> {
        self.strategies.get(&name)
    }

    /// Runs the named strategy against the request
    ///
    /// On success the identity is recorded on `ctx` and returned.
    ///
    /// # Errors
    ///
    /// - `AuthError::Rejected` for classified failures (see [`classify`])
    /// - `AuthError::Internal` for collaborator failures, unchanged
    pub async fn authenticate(
        &self,
        name: StrategyName,
        ctx: &mut RequestContext,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        let strategy = self
            .strategy(name)
            .ok_or_else(|| anyhow::anyhow!("Strategy {} is not registered", name))?;

        let outcome = strategy.authenticate(ctx, credentials).await;
        tracing::debug!(strategy = %name, outcome = outcome.label(), "Strategy finished");

        let identity = classify(outcome)?;
        ctx.login(identity.clone());

        Ok(identity)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Maps a strategy outcome onto the failure surface
///
/// | Outcome | Status | Code |
/// |---------|--------|------|
/// | `MissingCredentials`, unverifiable token | 401 | `INVALID_AUTH` |
/// | wrong-flavor or unknown-identity token | 401 | `INVALID_AUTH_TOKEN` |
/// | `InvalidCredentials` | 401 | `INVALID_ARGUMENTS` |
/// | `MissingDependency` | 500 | `INTERNAL` |
pub fn classify(outcome: AuthOutcome) -> Result<Identity, AuthError> {
    let failure = match outcome {
        AuthOutcome::Authenticated(identity) => return Ok(identity),
        AuthOutcome::InternalError(err) => return Err(AuthError::Internal(err)),
        AuthOutcome::MissingCredentials(info) => AuthFailure::unauthorized(ErrorCode::InvalidAuth, info),
        AuthOutcome::InvalidCredentials => {
            AuthFailure::unauthorized(ErrorCode::InvalidArguments, "Invalid login or password")
                .with_fields([USERNAME_FIELD, PASSWORD_FIELD])
        }
        AuthOutcome::InvalidToken {
            reason: TokenRejection::Unverifiable(info),
            ..
        } => AuthFailure::unauthorized(ErrorCode::InvalidAuth, info),
        AuthOutcome::InvalidToken { expected, reason } => {
            tracing::debug!(expected = expected.as_str(), ?reason, "Token refused");
            AuthFailure::unauthorized(ErrorCode::InvalidAuthToken, expected.invalid_message())
        }
        AuthOutcome::MissingDependency(reason) => {
            tracing::warn!(reason, "Authentication pipeline is missing a collaborator");
            AuthFailure::internal(reason)
        }
    };

    Err(AuthError::Rejected(failure))
}
