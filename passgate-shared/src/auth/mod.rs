/// Authentication primitives for Passgate
///
/// # Modules
///
/// - [`jwt`]: Access/refresh token minting and verification
/// - [`identity`]: User directory contract and per-request context
/// - [`strategy`]: Strategy trait, credentials and outcomes
/// - [`local`]: Login/password strategy
/// - [`bearer`]: Access-token and refresh-token strategies
/// - [`dispatcher`]: Runs a named strategy and classifies its outcome
/// - [`middleware`]: Axum wiring (factory, guards, directory attachment)
/// - [`password`]: Argon2id hashes for directories that store credentials
///
/// # Security Features
///
/// - **Stateless tokens**: validity depends only on signature and expiry
/// - **Flavor separation**: access and refresh tokens are never interchangeable
/// - **No sessions**: each request authenticates itself
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use passgate_shared::auth::dispatcher::Dispatcher;
/// use passgate_shared::auth::identity::{Identity, RequestContext};
/// use passgate_shared::auth::jwt::TokenCodec;
/// use passgate_shared::auth::strategy::{Credentials, StrategyName};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = Arc::new(TokenCodec::new("your-secret-key-at-least-32-bytes"));
/// let dispatcher = Dispatcher::new(codec.clone());
///
/// let token = codec.mint_access_token(&Identity::new("u1"))?;
///
/// // No directory attached: rejected as a setup failure
/// let mut ctx = RequestContext::new();
/// let result = dispatcher
///     .authenticate(StrategyName::Jwt, &mut ctx, &Credentials::bearer(token))
///     .await;
/// assert!(result.is_err());
/// # Ok(())
/// # }
/// ```

pub mod bearer;
pub mod dispatcher;
pub mod identity;
pub mod jwt;
pub mod local;
pub mod middleware;
pub mod password;
pub mod strategy;
