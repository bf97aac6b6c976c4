/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use passgate_api::{app::AppState, config::Config, directory::InMemoryDirectory};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let directory = InMemoryDirectory::new(config.auth.users.clone())?;
/// let state = AppState::new(config, Arc::new(directory));
/// let app = passgate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use passgate_shared::auth::{
    identity::{ApplicationManager, UserDirectory},
    jwt::TokenCodec,
    middleware::{application_from_extensions, attach_application, require, Authenticator},
    strategy::StrategyName,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Token codec, strategies and dispatcher
    pub auth: Arc<Authenticator>,

    /// Directory handle attached to every request
    pub application: ApplicationManager,
}

impl AppState {
    /// Creates new application state
    pub fn new(config: Config, directory: Arc<dyn UserDirectory>) -> Self {
        let codec = TokenCodec::with_lifetimes(
            &config.auth.jwt_secret,
            chrono_seconds(config.auth.access_token_ttl_secs),
            chrono_seconds(config.auth.refresh_token_ttl_secs),
        );

        Self {
            auth: Arc::new(Authenticator::new(codec, Arc::new(application_from_extensions))),
            application: ApplicationManager::new(directory),
            config: Arc::new(config),
        }
    }

    /// Codec for minting tokens
    pub fn codec(&self) -> &TokenCodec {
        self.auth.codec()
    }
}

fn chrono_seconds(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health               # Health check (public)
/// └── /v1/auth/
///     ├── POST /login           # `local` strategy
///     ├── POST /refresh         # `refresh_jwt` strategy
///     └── GET  /me              # `jwt` strategy
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Directory attachment (`ApplicationManager` request extension)
/// 4. Strategy guard (per route)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let login_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route_layer(middleware::from_fn(require(state.auth.clone(), StrategyName::Local)));

    let refresh_routes = Router::new()
        .route("/refresh", post(routes::auth::refresh))
        .route_layer(middleware::from_fn(require(state.auth.clone(), StrategyName::RefreshJwt)));

    let me_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route_layer(middleware::from_fn(require(state.auth.clone(), StrategyName::Jwt)));

    let auth_routes = Router::new()
        .merge(login_routes)
        .merge(refresh_routes)
        .merge(me_routes);

    let cors = if state.config.server.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1/auth", auth_routes)
        .layer(middleware::from_fn_with_state(
            state.application.clone(),
            attach_application,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
