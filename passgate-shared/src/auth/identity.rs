/// Identity collaborator contract and per-request context
///
/// Passgate never owns user records. It talks to an external user directory
/// through the [`UserDirectory`] trait, reached per request through an
/// [`ApplicationManager`] handle that the HTTP pipeline attaches to the
/// request. A [`RequestContext`] carries that handle into the strategies and
/// receives the authenticated [`Identity`] on success.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use passgate_shared::auth::identity::{
///     ApplicationManager, Identity, RequestContext, UserDirectory, UserQuery,
/// };
///
/// struct Directory;
///
/// #[async_trait]
/// impl UserDirectory for Directory {
///     async fn check_user_password(&self, login: &str, password: &str) -> anyhow::Result<Option<Identity>> {
///         Ok((login == "alice" && password == "secret").then(|| Identity::new("u1")))
///     }
///
///     async fn find_user(&self, query: &UserQuery) -> anyhow::Result<Option<Identity>> {
///         Ok((query.id == "u1").then(|| Identity::new("u1")))
///     }
/// }
///
/// let ctx = RequestContext::with_application(ApplicationManager::new(Arc::new(Directory)));
/// assert!(ctx.application().is_some());
/// assert!(ctx.user().is_none());
/// ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An authenticated principal as returned by the user directory
///
/// Only `id` is interpreted here. Every other field the directory returns is
/// kept verbatim in `attributes` and serialized alongside `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque identity reference, embedded in tokens
    pub id: String,

    /// Directory-specific fields (login, display name, ...)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Identity {
    /// Creates an identity with no extra attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Adds an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Lookup criteria passed to [`UserDirectory::find_user`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    /// Identity ID taken from token claims
    pub id: String,
}

/// External user directory
///
/// Both calls may suspend and may fail. Failures are forwarded by the
/// strategies as hard errors, never converted into rejections.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Checks a login/password pair, returning the identity on a match
    async fn check_user_password(&self, login: &str, password: &str) -> anyhow::Result<Option<Identity>>;

    /// Resolves an identity by reference
    async fn find_user(&self, query: &UserQuery) -> anyhow::Result<Option<Identity>>;
}

/// Request-scoped handle to the user directory
///
/// Inserted into request extensions by
/// [`attach_application`](crate::auth::middleware::attach_application).
#[derive(Clone)]
pub struct ApplicationManager {
    directory: Arc<dyn UserDirectory>,
}

impl ApplicationManager {
    /// Wraps a directory
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// The wrapped directory
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }
}

impl std::fmt::Debug for ApplicationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationManager").finish_non_exhaustive()
    }
}

/// Per-request authentication state
///
/// Created empty for every request, filled with the directory handle if the
/// pipeline provides one, and given the identity once a strategy succeeds.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    application: Option<ApplicationManager>,
    user: Option<Identity>,
}

impl RequestContext {
    /// Context without a directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying a directory handle
    pub fn with_application(application: ApplicationManager) -> Self {
        Self {
            application: Some(application),
            user: None,
        }
    }

    /// Directory handle, if the pipeline attached one
    pub fn application(&self) -> Option<&ApplicationManager> {
        self.application.as_ref()
    }

    /// Authenticated identity, if any
    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    /// Records the authenticated identity (no session is created)
    pub fn login(&mut self, identity: Identity) {
        self.user = Some(identity);
    }

    /// Whether a strategy has authenticated this request
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
