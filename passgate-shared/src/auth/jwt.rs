/// JWT token minting and verification module
///
/// This module issues the two bearer tokens used by Passgate and maps a
/// presented token back to its claims. Both flavors share a single claim
/// format and a single signing secret; they differ only by the `isRefresh`
/// flag and by their lifetime.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 3 hours for access tokens, 7 days for refresh tokens
/// - **Validation**: Signature and expiration, no clock-skew leeway
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Token Types
///
/// - **Access Token**: `{id, iat, exp}`, accepted by the `jwt` strategy
/// - **Refresh Token**: `{id, isRefresh: true, iat, exp}`, accepted by the `refresh_jwt` strategy
///
/// # Example
///
/// ```
/// use passgate_shared::auth::identity::Identity;
/// use passgate_shared::auth::jwt::{TokenCodec, TokenKind};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("your-secret-key-at-least-32-bytes");
/// let user = Identity::new("u1");
///
/// let token = codec.mint_access_token(&user)?;
/// let claims = codec.decode_and_verify(&token)?;
/// assert_eq!(claims.id, "u1");
/// assert_eq!(claims.kind(), TokenKind::Access);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or format check failed
    #[error("Token is not valid: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token verified but its payload could not be read as claims
    #[error("No payload")]
    NoPayload,
}

impl JwtError {
    /// True for the ordinary "token not valid" conditions (bad signature,
    /// malformed token, expired). `NoPayload` and `CreateError` are not
    /// part of that class.
    pub fn is_not_valid(&self) -> bool {
        matches!(self, JwtError::Invalid(_) | JwtError::Expired)
    }
}

/// Token flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Access token (short-lived, 3 hours)
    Access,

    /// Refresh token (long-lived, 7 days)
    Refresh,
}

impl TokenKind {
    /// Gets default expiration duration for token kind
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(3),
            TokenKind::Refresh => Duration::days(7),
        }
    }

    /// Gets token kind as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// Message reported when a token is refused for this kind
    pub fn invalid_message(&self) -> &'static str {
        match self {
            TokenKind::Access => "Invalid access token",
            TokenKind::Refresh => "Invalid refresh token",
        }
    }
}

/// JWT claims structure
///
/// # Claims
///
/// - `id`: Identity reference
/// - `isRefresh`: Present and `true` only on refresh tokens
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity ID, numeric ids are read as their decimal string
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    /// Refresh marker, absent on access tokens
    #[serde(rename = "isRefresh", default, skip_serializing_if = "Option::is_none")]
    pub is_refresh: Option<bool>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for an identity, expiring `expires_in` from now
    pub fn new(id: impl Into<String>, kind: TokenKind, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            id: id.into(),
            is_refresh: match kind {
                TokenKind::Access => None,
                TokenKind::Refresh => Some(true),
            },
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Token kind derived from the refresh marker
    ///
    /// A missing or `false` marker means an access token.
    pub fn kind(&self) -> TokenKind {
        if self.is_refresh.unwrap_or(false) {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(id) => Ok(id),
        RawId::Number(id) => Ok(id.to_string()),
    }
}

/// Signs and verifies Passgate tokens with a process-wide secret
///
/// The codec holds no mutable state; a single instance is shared by all
/// strategies and request handlers.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec with the default 3 hour / 7 day lifetimes
    pub fn new(secret: &str) -> Self {
        Self::with_lifetimes(
            secret,
            TokenKind::Access.default_expiration(),
            TokenKind::Refresh.default_expiration(),
        )
    }

    /// Creates a codec with custom lifetimes
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Duration;
    /// use passgate_shared::auth::jwt::TokenCodec;
    ///
    /// let codec = TokenCodec::with_lifetimes(
    ///     "your-secret-key-at-least-32-bytes",
    ///     Duration::minutes(15),
    ///     Duration::days(1),
    /// );
    /// ```
    pub fn with_lifetimes(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime applied to tokens of the given kind
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Mints an access token `{id}` for the identity
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if signing fails
    pub fn mint_access_token(&self, identity: &Identity) -> Result<String, JwtError> {
        self.mint(identity, TokenKind::Access)
    }

    /// Mints a refresh token `{id, isRefresh: true}` for the identity
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if signing fails
    pub fn mint_refresh_token(&self, identity: &Identity) -> Result<String, JwtError> {
        self.mint(identity, TokenKind::Refresh)
    }

    fn mint(&self, identity: &Identity, kind: TokenKind) -> Result<String, JwtError> {
        let claims = Claims::new(identity.id.clone(), kind, self.lifetime(kind));
        self.sign(&claims)
    }

    /// Signs arbitrary claims with the codec's secret
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and extracts its claims
    ///
    /// Verifies the signature and expiration first, then reads the payload
    /// as `Claims`. A token that passes verification but whose payload does
    /// not carry the expected claims yields `JwtError::NoPayload`.
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` if the token is past `exp`
    /// - `JwtError::Invalid` if the signature or format check fails
    /// - `JwtError::NoPayload` if the verified payload is not a claims object
    ///
    /// # Example
    ///
    /// ```
    /// use passgate_shared::auth::identity::Identity;
    /// use passgate_shared::auth::jwt::{TokenCodec, TokenKind};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let codec = TokenCodec::new("your-secret-key-at-least-32-bytes");
    /// let token = codec.mint_refresh_token(&Identity::new("u1"))?;
    ///
    /// let claims = codec.decode_and_verify(&token)?;
    /// assert_eq!(claims.kind(), TokenKind::Refresh);
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode_and_verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let verified = decode::<serde_json::Value>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        serde_json::from_value::<Claims>(verified.claims).map_err(|_| JwtError::NoPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_kind_expiration() {
        assert_eq!(TokenKind::Access.default_expiration(), Duration::hours(3));
        assert_eq!(TokenKind::Refresh.default_expiration(), Duration::days(7));
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("u1", TokenKind::Access, Duration::hours(3));

        assert_eq!(claims.id, "u1");
        assert_eq!(claims.is_refresh, None);
        assert_eq!(claims.kind(), TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 3 * 3600);
    }

    #[test]
    fn test_claims_wire_format() {
        let access = Claims::new("u1", TokenKind::Access, Duration::hours(1));
        let json = serde_json::to_value(&access).unwrap();
        assert!(json.get("isRefresh").is_none());
        assert_eq!(json["id"], "u1");

        let refresh = Claims::new("u1", TokenKind::Refresh, Duration::hours(1));
        let json = serde_json::to_value(&refresh).unwrap();
        assert_eq!(json["isRefresh"], true);
    }

    #[test]
    fn test_explicit_false_flag_is_access() {
        let mut claims = Claims::new("u1", TokenKind::Access, Duration::hours(1));
        claims.is_refresh = Some(false);
        assert_eq!(claims.kind(), TokenKind::Access);
    }

    #[test]
    fn test_mint_and_verify_access_token() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .mint_access_token(&Identity::new("u1"))
            .expect("Should create token");

        let claims = codec.decode_and_verify(&token).expect("Should verify token");
        assert_eq!(claims.id, "u1");
        assert_eq!(claims.is_refresh, None);
        assert_eq!(claims.exp - claims.iat, 3 * 3600);
    }

    #[test]
    fn test_mint_and_verify_refresh_token() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.mint_refresh_token(&Identity::new("u1")).unwrap();

        let claims = codec.decode_and_verify(&token).unwrap();
        assert_eq!(claims.id, "u1");
        assert_eq!(claims.is_refresh, Some(true));
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = TokenCodec::new(SECRET)
            .mint_access_token(&Identity::new("u1"))
            .unwrap();

        let result = TokenCodec::new("another-secret-key-at-least-32-bytes").decode_and_verify(&token);
        let err = result.unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
        assert!(err.is_not_valid());
    }

    #[test]
    fn test_verify_garbage() {
        let err = TokenCodec::new(SECRET).decode_and_verify("not-a-jwt").unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn test_verify_expired_token() {
        let codec = TokenCodec::with_lifetimes(SECRET, Duration::seconds(-3600), Duration::seconds(-3600));

        for token in [
            codec.mint_access_token(&Identity::new("u1")).unwrap(),
            codec.mint_refresh_token(&Identity::new("u1")).unwrap(),
        ] {
            let err = codec.decode_and_verify(&token).unwrap_err();
            assert!(matches!(err, JwtError::Expired));
            assert!(err.is_not_valid());
        }
    }

    #[test]
    fn test_verified_token_without_claims_is_no_payload() {
        #[derive(Serialize)]
        struct Bare {
            exp: i64,
        }

        let bare = Bare {
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &bare,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = TokenCodec::new(SECRET).decode_and_verify(&token).unwrap_err();
        assert!(matches!(err, JwtError::NoPayload));
        assert!(!err.is_not_valid());
    }

    #[test]
    fn test_custom_lifetimes() {
        let codec = TokenCodec::with_lifetimes(SECRET, Duration::minutes(15), Duration::days(1));
        assert_eq!(codec.lifetime(TokenKind::Access), Duration::minutes(15));

        let token = codec.mint_access_token(&Identity::new("u1")).unwrap();
        let claims = codec.decode_and_verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_numeric_id_is_read_as_string() {
        let exp = (Utc::now() + Duration::minutes(10)).timestamp();
        let payload = serde_json::json!({ "id": 42, "iat": exp - 600, "exp": exp });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let claims = TokenCodec::new(SECRET).decode_and_verify(&token).unwrap();
        assert_eq!(claims.id, "42");
        assert_eq!(claims.kind(), TokenKind::Access);
    }

    #[test]
    fn test_non_scalar_id_is_no_payload() {
        let exp = (Utc::now() + Duration::minutes(10)).timestamp();
        let payload = serde_json::json!({ "id": { "nested": true }, "iat": exp - 600, "exp": exp });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = TokenCodec::new(SECRET).decode_and_verify(&token).unwrap_err();
        assert!(matches!(err, JwtError::NoPayload));
    }
}
