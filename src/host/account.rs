//! Account lookups.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Matching accounts: user id -> password hash (if the account has one).
///
/// Ordered, so "the first match" is stable across calls.
pub type AccountMatches = BTreeMap<String, Option<String>>;

/// Read access to the host's account registry.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find every account whose id equals `user_id` ignoring case.
    async fn get_users_by_id_case_insensitive(&self, user_id: &str) -> Result<AccountMatches>;
}

/// Account store holding a fixed set of user ids in memory.
///
/// Intended for tests and dry runs; a real host backs [`AccountStore`] with its
/// database.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    users: RwLock<AccountMatches>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_user_ids<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: RwLock::new(user_ids.into_iter().map(|id| (id.into(), None)).collect()),
        }
    }

    pub fn insert(&self, user_id: impl Into<String>, password_hash: Option<String>) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("Account store lock poisoned"))?;
        users.insert(user_id.into(), password_hash);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get_users_by_id_case_insensitive(&self, user_id: &str) -> Result<AccountMatches> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow!("Account store lock poisoned"))?;

        let wanted = user_id.to_lowercase();
        Ok(users
            .iter()
            .filter(|(id, _)| id.to_lowercase() == wanted)
            .map(|(id, hash)| (id.clone(), hash.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_case_insensitive_lookup() {
        let store = MemoryAccountStore::from_user_ids(["@Alice:hs.example.com", "@bob:hs.example.com"]);

        let matches = store
            .get_users_by_id_case_insensitive("@alice:hs.example.com")
            .await
            .unwrap();
        assert_eq!(matches.keys().collect::<Vec<_>>(), vec!["@Alice:hs.example.com"]);

        let none = store
            .get_users_by_id_case_insensitive("@carol:hs.example.com")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_matches_are_ordered() {
        let store = MemoryAccountStore::new();
        store.insert("@alice:hs.example.com", Some("hash".to_string())).unwrap();
        store.insert("@ALICE:hs.example.com", None).unwrap();
        assert_eq!(store.len(), 2);

        let matches = store
            .get_users_by_id_case_insensitive("@Alice:hs.example.com")
            .await
            .unwrap();
        let ids: Vec<&String> = matches.keys().collect();
        assert_eq!(ids, vec!["@ALICE:hs.example.com", "@alice:hs.example.com"]);
        assert_eq!(matches["@alice:hs.example.com"].as_deref(), Some("hash"));
    }
}
