/// Built-in user directory
///
/// A read-only, in-memory [`UserDirectory`] seeded from `auth.users`.
/// Passwords are stored as Argon2id hashes and checked on the blocking pool.
/// Deployments with a real user store plug their own `UserDirectory` into
/// [`AppState`](crate::app::AppState) instead.

use std::collections::HashMap;

use async_trait::async_trait;
use passgate_shared::auth::identity::{Identity, UserDirectory, UserQuery};
use passgate_shared::auth::password::verify_password_blocking;

use crate::config::UserEntry;

/// Users keyed by ID, with a login index
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, UserEntry>,
    by_login: HashMap<String, String>,
}

impl InMemoryDirectory {
    /// Builds the directory
    ///
    /// # Errors
    ///
    /// Fails on duplicate IDs or logins.
    pub fn new(entries: impl IntoIterator<Item = UserEntry>) -> anyhow::Result<Self> {
        let mut directory = Self::default();

        for entry in entries {
            if directory.users.contains_key(&entry.id) {
                anyhow::bail!("Duplicate user id in auth.users: {}", entry.id);
            }
            if directory.by_login.contains_key(&entry.login) {
                anyhow::bail!("Duplicate login in auth.users: {}", entry.login);
            }

            directory.by_login.insert(entry.login.clone(), entry.id.clone());
            directory.users.insert(entry.id.clone(), entry);
        }

        Ok(directory)
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory has no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn identity(entry: &UserEntry) -> Identity {
        let identity = Identity::new(entry.id.clone()).with_attribute("login", entry.login.clone());

        match &entry.name {
            Some(name) => identity.with_attribute("name", name.clone()),
            None => identity,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn check_user_password(&self, login: &str, password: &str) -> anyhow::Result<Option<Identity>> {
        let Some(entry) = self.by_login.get(login).and_then(|id| self.users.get(id)) else {
            return Ok(None);
        };

        let matches = verify_password_blocking(password.to_string(), entry.password_hash.clone()).await?;

        Ok(matches.then(|| Self::identity(entry)))
    }

    async fn find_user(&self, query: &UserQuery) -> anyhow::Result<Option<Identity>> {
        Ok(self.users.get(&query.id).map(Self::identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgate_shared::auth::password::hash_password;

    fn entry(id: &str, login: &str, password: &str) -> UserEntry {
        UserEntry {
            id: id.to_string(),
            login: login.to_string(),
            password_hash: hash_password(password).unwrap(),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_check_user_password() {
        let mut alice = entry("u1", "alice", "wonderland");
        alice.name = Some("Alice".to_string());
        let directory = InMemoryDirectory::new([alice]).unwrap();

        let identity = directory
            .check_user_password("alice", "wonderland")
            .await
            .unwrap()
            .expect("should match");
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.attributes["login"], "alice");
        assert_eq!(identity.attributes["name"], "Alice");

        assert!(directory.check_user_password("alice", "nope").await.unwrap().is_none());
        assert!(directory.check_user_password("bob", "wonderland").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_user() {
        let directory = InMemoryDirectory::new([entry("u1", "alice", "wonderland")]).unwrap();

        let found = directory.find_user(&UserQuery { id: "u1".to_string() }).await.unwrap();
        assert_eq!(found.map(|i| i.id), Some("u1".to_string()));

        let missing = directory.find_user(&UserQuery { id: "u2".to_string() }).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_an_error() {
        let mut broken = entry("u1", "alice", "wonderland");
        broken.password_hash = "not-a-phc-string".to_string();
        let directory = InMemoryDirectory::new([broken]).unwrap();

        assert!(directory.check_user_password("alice", "wonderland").await.is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = InMemoryDirectory::new([
            entry("u1", "alice", "a"),
            entry("u1", "bob", "b"),
        ]);
        assert!(result.is_err());

        let result = InMemoryDirectory::new([
            entry("u1", "alice", "a"),
            entry("u2", "alice", "b"),
        ]);
        assert!(result.is_err());
    }
}
