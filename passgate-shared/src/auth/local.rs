/// Login/password strategy (`local`)
///
/// Checks a `login`/`password` pair with the user directory. No session is
/// created; a successful check only yields the identity for this request.

use async_trait::async_trait;

use super::identity::RequestContext;
use super::strategy::{AuthOutcome, Credentials, Strategy, StrategyName, MISSING_APPLICATION};

/// Session-less password strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStrategy;

impl LocalStrategy {
    /// Creates the strategy
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for LocalStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Local
    }

    async fn authenticate(&self, ctx: &RequestContext, credentials: &Credentials) -> AuthOutcome {
        let Some(application) = ctx.application() else {
            return AuthOutcome::MissingDependency(MISSING_APPLICATION);
        };

        let (Some(login), Some(password)) = (credentials.login.as_deref(), credentials.password.as_deref())
        else {
            return AuthOutcome::MissingCredentials("Missing credentials");
        };

        match application.directory().check_user_password(login, password).await {
            Ok(Some(identity)) => AuthOutcome::Authenticated(identity),
            Ok(None) => AuthOutcome::InvalidCredentials,
            Err(err) => AuthOutcome::InternalError(err),
        }
    }
}
