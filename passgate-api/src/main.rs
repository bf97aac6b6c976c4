//! # Passgate API Server
//!
//! Issues access/refresh token pairs for login/password credentials and
//! guards routes with the `local`, `jwt` and `refresh_jwt` strategies.
//!
//! ## Usage
//!
//! ```bash
//! # Serve
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p passgate-api
//!
//! # Produce a password hash for `auth.users`
//! cargo run -p passgate-api -- hash-password 'wonderland'
//! ```

use std::sync::Arc;

use passgate_api::{app, config::Config, directory::InMemoryDirectory};
use passgate_shared::auth::password::hash_password;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("hash-password") {
        let plaintext = args
            .get(1)
            .ok_or_else(|| anyhow::anyhow!("usage: passgate-api hash-password <password>"))?;
        println!("{}", hash_password(plaintext)?);
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passgate_api=debug,passgate_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Passgate API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let directory = InMemoryDirectory::new(config.auth.users.clone())?;
    if directory.is_empty() {
        tracing::warn!("auth.users is empty; every login will be rejected");
    } else {
        tracing::info!(users = directory.len(), "User directory loaded");
    }

    let bind_address = config.bind_address();
    let router = app::build_router(app::AppState::new(config, Arc::new(directory)));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
