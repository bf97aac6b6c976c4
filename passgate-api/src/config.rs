/// Configuration management for the API server
///
/// Configuration is layered with the `config` crate, later sources winning:
///
/// 1. Built-in defaults
/// 2. `config/default.{toml,yaml,json}` (optional)
/// 3. `config/{RUN_MODE}.{toml,yaml,json}` (optional, `RUN_MODE` defaults to `development`)
/// 4. Environment variables prefixed `PASSGATE__`, e.g. `PASSGATE__AUTH__JWT_SECRET`
/// 5. `JWT_SECRET`, if set
///
/// A `.env` file is loaded first when present.
///
/// # Keys
///
/// - `server.host` / `server.port`: Bind address (default `0.0.0.0:8080`)
/// - `server.cors_origins`: Allowed origins, `"*"` for any (default `["*"]`)
/// - `auth.jwtSecret`: Token signing secret (required, at least 32 bytes; `auth.jwt_secret` also accepted)
/// - `auth.access_token_ttl_secs`: Access token lifetime (default 3 hours)
/// - `auth.refresh_token_ttl_secs`: Refresh token lifetime (default 7 days)
/// - `auth.users`: Users served by the built-in directory
///
/// # Example
///
/// ```toml
/// [auth]
/// jwtSecret = "0123456789abcdef0123456789abcdef"
///
/// [[auth.users]]
/// id = "u1"
/// login = "alice"
/// password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
/// name = "Alice"
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Minimum accepted length of the signing secret, in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Accepted spellings of the signing secret key, in priority order
const SECRET_KEYS: [&str; 3] = ["auth.jwt_secret", "auth.jwtSecret", "auth.jwtsecret"];

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    ///
    /// Read from `auth.jwt_secret` or `auth.jwtSecret`, see [`Config::load`].
    #[serde(default)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: u64,

    /// Users served by the built-in directory
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("users", &self.users.len())
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: default_access_ttl(),
            refresh_token_ttl_secs: default_refresh_ttl(),
            users: Vec::new(),
        }
    }
}

/// A user record for the built-in directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    /// Identity ID embedded in tokens
    pub id: String,

    /// Login name
    pub login: String,

    /// Argon2id PHC hash (see `passgate-api hash-password`)
    pub password_hash: String,

    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_access_ttl() -> u64 {
    3 * 60 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

impl Config {
    /// Loads configuration from files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A configuration file is malformed
    /// - `auth.jwtSecret` is missing or shorter than 32 bytes
    /// - A lifetime is zero
    ///
    /// # Example
    ///
    /// ```no_run
    /// use passgate_api::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::load()?;
    /// println!("Server will listen on {}", config.bind_address());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                config::Environment::with_prefix("PASSGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_settings(settings, env::var("JWT_SECRET").ok())
    }

    /// Builds the configuration from merged sources
    ///
    /// The signing secret is taken from `secret_override` when given, then
    /// from `auth.jwt_secret`, then from `auth.jwtSecret`. The resolved value
    /// replaces whatever was deserialized, so either spelling may appear in
    /// any source.
    pub fn from_settings(settings: config::Config, secret_override: Option<String>) -> anyhow::Result<Self> {
        let secret = secret_override
            .or_else(|| SECRET_KEYS.iter().find_map(|key| settings.get_string(key).ok()));

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        config.auth.jwt_secret = secret.unwrap_or_default();
        config.validate()?;

        Ok(config)
    }

    /// Checks values the type system cannot
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "auth.jwtSecret must be at least {} bytes long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            anyhow::bail!("Token lifetimes must be greater than zero");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
