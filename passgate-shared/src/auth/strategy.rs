/// Authentication strategy contract
///
/// A strategy evaluates one credential shape against the request context and
/// reports an [`AuthOutcome`]. Strategies never raise: rejections and
/// collaborator failures are both values the dispatcher pattern-matches on.
///
/// # Strategies
///
/// | Name          | Credential           | Implementation |
/// |---------------|----------------------|----------------|
/// | `local`       | `login` + `password` | [`LocalStrategy`](super::local::LocalStrategy) |
/// | `jwt`         | bearer access token  | [`BearerStrategy::access`](super::bearer::BearerStrategy::access) |
/// | `refresh_jwt` | bearer refresh token | [`BearerStrategy::refresh`](super::bearer::BearerStrategy::refresh) |

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::identity::{Identity, RequestContext};
use super::jwt::TokenKind;

/// Request field carrying the login
pub const USERNAME_FIELD: &str = "login";

/// Request field carrying the password
pub const PASSWORD_FIELD: &str = "password";

/// Reason reported when no directory is attached to the request
pub const MISSING_APPLICATION: &str = "ApplicationManager is not provided";

/// Strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    /// Login/password
    Local,

    /// Access token
    Jwt,

    /// Refresh token
    RefreshJwt,
}

impl StrategyName {
    /// All strategies, in registration order
    pub const ALL: [StrategyName; 3] = [StrategyName::Local, StrategyName::Jwt, StrategyName::RefreshJwt];

    /// Gets strategy name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Local => "local",
            StrategyName::Jwt => "jwt",
            StrategyName::RefreshJwt => "refresh_jwt",
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown authentication strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyName {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(StrategyName::Local),
            "jwt" => Ok(StrategyName::Jwt),
            "refresh_jwt" => Ok(StrategyName::RefreshJwt),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Credentials extracted from an inbound request
///
/// Each strategy reads only the fields matching its credential shape.
/// Empty strings are normalized to `None`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `login` request field
    pub login: Option<String>,

    /// `password` request field
    pub password: Option<String>,

    /// Token from `Authorization: Bearer <token>`
    pub bearer: Option<String>,
}

impl Credentials {
    /// Login/password credentials
    pub fn password(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: non_empty(login.into()),
            password: non_empty(password.into()),
            bearer: None,
        }
    }

    /// Bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: non_empty(token.into()),
            ..Self::default()
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Why a token was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    /// Signature/format/expiry check failed
    Unverifiable(String),

    /// `isRefresh` did not match the strategy
    WrongKind,

    /// Claims referenced an identity the directory does not know
    UnknownIdentity,
}

/// Outcome of a single strategy run
#[derive(Debug)]
pub enum AuthOutcome {
    /// The request is authenticated as this identity
    Authenticated(Identity),

    /// The request carried nothing this strategy can evaluate
    MissingCredentials(&'static str),

    /// Login/password pair was refused
    InvalidCredentials,

    /// Token was refused
    InvalidToken {
        /// Flavor the strategy expected
        expected: TokenKind,
        /// Rejection reason
        reason: TokenRejection,
    },

    /// The pipeline did not attach a required collaborator
    MissingDependency(&'static str),

    /// The collaborator (or codec) failed unexpectedly
    InternalError(anyhow::Error),
}

impl AuthOutcome {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            AuthOutcome::Authenticated(_) => "authenticated",
            AuthOutcome::MissingCredentials(_) => "missing_credentials",
            AuthOutcome::InvalidCredentials => "invalid_credentials",
            AuthOutcome::InvalidToken { .. } => "invalid_token",
            AuthOutcome::MissingDependency(_) => "missing_dependency",
            AuthOutcome::InternalError(_) => "internal_error",
        }
    }
}

/// A named, pluggable authentication procedure
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Name the strategy is dispatched under
    fn name(&self) -> StrategyName;

    /// Evaluates the credentials against the request context
    async fn authenticate(&self, ctx: &RequestContext, credentials: &Credentials) -> AuthOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_name_roundtrip() {
        for name in StrategyName::ALL {
            assert_eq!(name.as_str().parse::<StrategyName>().unwrap(), name);
        }
        assert_eq!(StrategyName::RefreshJwt.to_string(), "refresh_jwt");
    }

    #[test]
    fn test_unknown_strategy_name() {
        let err = "basic".parse::<StrategyName>().unwrap_err();
        assert_eq!(err, UnknownStrategy("basic".to_string()));
    }

    #[test]
    fn test_empty_credentials_are_missing() {
        let creds = Credentials::password("", "secret");
        assert!(creds.login.is_none());
        assert_eq!(creds.password.as_deref(), Some("secret"));

        assert!(Credentials::bearer("").bearer.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::password("alice", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
