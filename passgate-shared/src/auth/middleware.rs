/// Authentication middleware for Axum
///
/// This module wires the strategy dispatcher into an Axum pipeline.
///
/// # Middleware Types
///
/// - **Application attachment**: [`attach_application`] puts the user
///   directory handle into request extensions, where strategies look for it
/// - **Strategy guard**: [`require`] runs one named strategy and rejects the
///   request before the handler on failure
///
/// # Request Extensions
///
/// After successful authentication, the guard adds:
/// - [`AuthenticatedUser`]: the identity resolved by the strategy
///
/// No session or cookie is created; every request authenticates itself.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Extension, Router};
/// use passgate_shared::auth::identity::ApplicationManager;
/// use passgate_shared::auth::middleware::{attach_application, require, AuthenticatedUser, Authenticator};
/// use passgate_shared::auth::strategy::StrategyName;
///
/// async fn me(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> String {
///     user.id
/// }
///
/// # fn example(application: ApplicationManager) {
/// let auth = Arc::new(Authenticator::from_secret("your-secret-key-at-least-32-bytes"));
///
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .route_layer(middleware::from_fn(require(auth, StrategyName::Jwt)))
///     .layer(middleware::from_fn_with_state(application, attach_application));
/// # }
/// ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{header, Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use super::dispatcher::Dispatcher;
use super::identity::{ApplicationManager, Identity, RequestContext};
use super::jwt::TokenCodec;
use super::strategy::{Credentials, StrategyName};
use crate::error::{AuthError, AuthFailure, ErrorCode};

/// Largest request body buffered to read `login`/`password`
pub const MAX_CREDENTIALS_BODY: usize = 64 * 1024;

/// Resolves the directory handle for a request
pub type ApplicationResolver = Arc<dyn Fn(&Extensions) -> Option<ApplicationManager> + Send + Sync>;

/// Identity attached to the request after successful authentication
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use passgate_shared::auth::middleware::AuthenticatedUser;
///
/// async fn handler(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> String {
///     format!("User: {}", user.id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser(pub Identity);

/// Default resolver: reads the [`ApplicationManager`] extension
pub fn application_from_extensions(extensions: &Extensions) -> Option<ApplicationManager> {
    extensions.get::<ApplicationManager>().cloned()
}

/// Token codec, strategies and dispatcher, built once per process
///
/// All strategies are constructed explicitly here; nothing is registered
/// globally. The authenticator is read-only after construction and is
/// shared behind an `Arc`.
#[derive(Clone)]
pub struct Authenticator {
    codec: Arc<TokenCodec>,
    dispatcher: Dispatcher,
    resolver: ApplicationResolver,
}

impl Authenticator {
    /// Builds the strategies around `codec`, resolving the directory with `resolver`
    pub fn new(codec: TokenCodec, resolver: ApplicationResolver) -> Self {
        let codec = Arc::new(codec);

        Self {
            dispatcher: Dispatcher::new(codec.clone()),
            codec,
            resolver,
        }
    }

    /// Default-lifetime codec and the extension resolver
    pub fn from_secret(secret: &str) -> Self {
        Self::new(TokenCodec::new(secret), Arc::new(application_from_extensions))
    }

    /// Codec used by the token strategies, also for minting
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Strategy dispatcher
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Fresh request context for a request's extensions
    pub fn context_for(&self, extensions: &Extensions) -> RequestContext {
        match (self.resolver)(extensions) {
            Some(application) => RequestContext::with_application(application),
            None => RequestContext::new(),
        }
    }

    /// Authenticates `req` with `strategy` and runs the rest of the pipeline
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's [`AuthError`]; `next` is not run in that case.
    pub async fn authenticate_request(
        &self,
        strategy: StrategyName,
        req: Request,
        next: Next,
    ) -> Result<Response, AuthError> {
        let (mut req, credentials) = extract_credentials(strategy, req).await?;
        let mut ctx = self.context_for(req.extensions());

        let identity = self
            .dispatcher
            .authenticate(strategy, &mut ctx, &credentials)
            .await?;

        tracing::debug!(strategy = %strategy, user_id = %identity.id, "Request authenticated");
        req.extensions_mut().insert(AuthenticatedUser(identity));

        Ok(next.run(req).await)
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("codec", &self.codec)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Creates a strategy guard closure for `axum::middleware::from_fn`
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::post, Router};
/// use passgate_shared::auth::middleware::{require, Authenticator};
/// use passgate_shared::auth::strategy::StrategyName;
///
/// let auth = Arc::new(Authenticator::from_secret("secret"));
/// let app: Router = Router::new()
///     .route("/login", post(|| async { "OK" }))
///     .route_layer(middleware::from_fn(require(auth, StrategyName::Local)));
/// ```
pub fn require(
    authenticator: Arc<Authenticator>,
    strategy: StrategyName,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    move |req, next| {
        let authenticator = authenticator.clone();
        Box::pin(async move { authenticator.authenticate_request(strategy, req, next).await })
    }
}

/// Attaches the directory handle to every request passing through
pub async fn attach_application(
    State(application): State<ApplicationManager>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(application);
    next.run(req).await
}

#[derive(Debug, Default, Deserialize)]
struct LoginFields {
    login: Option<String>,
    password: Option<String>,
}

/// Pulls the credential shape `strategy` needs out of the request
///
/// Token strategies read the bearer header only. The `local` strategy reads
/// `login`/`password` from a JSON or form-encoded body, falling back to the
/// query string;
/// the buffered body is put back for the handler.
async fn extract_credentials(
    strategy: StrategyName,
    req: Request,
) -> Result<(Request, Credentials), AuthError> {
    match strategy {
        StrategyName::Jwt | StrategyName::RefreshJwt => {
            let credentials = bearer_token(req.headers())
                .map(Credentials::bearer)
                .unwrap_or_default();
            Ok((req, credentials))
        }
        StrategyName::Local => {
            let (parts, body) = req.into_parts();
            let bytes = axum::body::to_bytes(body, MAX_CREDENTIALS_BODY)
                .await
                .map_err(|_| {
                    AuthFailure::new(
                        axum::http::StatusCode::BAD_REQUEST,
                        ErrorCode::InvalidArguments,
                        "Unreadable request body",
                    )
                })?;

            let fields = body_fields(&parts.headers, &bytes)
                .filter(|f| f.login.is_some() || f.password.is_some())
                .or_else(|| Query::<LoginFields>::try_from_uri(&parts.uri).ok().map(|q| q.0))
                .unwrap_or_default();

            let credentials = Credentials::password(
                fields.login.unwrap_or_default(),
                fields.password.unwrap_or_default(),
            );

            Ok((Request::from_parts(parts, Body::from(bytes)), credentials))
        }
    }
}

/// Login fields from a form or JSON body, chosen by `Content-Type`
fn body_fields(headers: &HeaderMap, bytes: &[u8]) -> Option<LoginFields> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));

    if is_form {
        serde_urlencoded::from_bytes(bytes).ok()
    } else {
        serde_json::from_slice(bytes).ok()
    }
}

/// Token from `Authorization: Bearer <token>`, scheme matched case-insensitively
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}
