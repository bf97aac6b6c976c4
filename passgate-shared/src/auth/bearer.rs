/// Bearer token strategies (`jwt` and `refresh_jwt`)
///
/// Both strategies verify the presented token with the shared
/// [`TokenCodec`], then insist that the token's `isRefresh` flag matches the
/// flavor they accept before resolving the identity. An access token is
/// never accepted as a refresh token and vice versa.

use std::sync::Arc;

use async_trait::async_trait;

use super::identity::{RequestContext, UserQuery};
use super::jwt::{JwtError, TokenCodec, TokenKind};
use super::strategy::{
    AuthOutcome, Credentials, Strategy, StrategyName, TokenRejection, MISSING_APPLICATION,
};

/// Token strategy accepting one token flavor
#[derive(Debug, Clone)]
pub struct BearerStrategy {
    codec: Arc<TokenCodec>,
    kind: TokenKind,
}

impl BearerStrategy {
    /// Access-token strategy (`jwt`)
    pub fn access(codec: Arc<TokenCodec>) -> Self {
        Self {
            codec,
            kind: TokenKind::Access,
        }
    }

    /// Refresh-token strategy (`refresh_jwt`)
    pub fn refresh(codec: Arc<TokenCodec>) -> Self {
        Self {
            codec,
            kind: TokenKind::Refresh,
        }
    }

    /// Flavor this strategy accepts
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    fn refuse(&self, reason: TokenRejection) -> AuthOutcome {
        AuthOutcome::InvalidToken {
            expected: self.kind,
            reason,
        }
    }
}

#[async_trait]
impl Strategy for BearerStrategy {
    fn name(&self) -> StrategyName {
        match self.kind {
            TokenKind::Access => StrategyName::Jwt,
            TokenKind::Refresh => StrategyName::RefreshJwt,
        }
    }

    async fn authenticate(&self, ctx: &RequestContext, credentials: &Credentials) -> AuthOutcome {
        let Some(application) = ctx.application() else {
            return AuthOutcome::MissingDependency(MISSING_APPLICATION);
        };

        let Some(token) = credentials.bearer.as_deref() else {
            return AuthOutcome::MissingCredentials("No auth token");
        };

        let claims = match self.codec.decode_and_verify(token) {
            Ok(claims) => claims,
            Err(JwtError::NoPayload) => {
                return AuthOutcome::InternalError(anyhow::Error::new(JwtError::NoPayload))
            }
            Err(err) => return self.refuse(TokenRejection::Unverifiable(err.to_string())),
        };

        if claims.kind() != self.kind {
            return self.refuse(TokenRejection::WrongKind);
        }

        match application.directory().find_user(&UserQuery { id: claims.id }).await {
            Ok(Some(identity)) => AuthOutcome::Authenticated(identity),
            Ok(None) => self.refuse(TokenRejection::UnknownIdentity),
            Err(err) => AuthOutcome::InternalError(err),
        }
    }
}
