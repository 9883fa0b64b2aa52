//! In-memory key pair cache keyed by identity
//!
//! A convenience for reusing freshly generated pairs within a session,
//! never a source of truth. Concurrent inserts for the same identity
//! resolve last-write-wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::keys::KeyPair;

/// Identity → [`KeyPair`] store shared by one or more services
#[derive(Debug, Default)]
pub struct KeyCache {
    entries: RwLock<HashMap<String, KeyPair>>,
}

impl KeyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `pair` under its identity, replacing any earlier entry
    pub fn insert(&self, pair: KeyPair) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        debug!(identity = %pair.identity, "caching key pair");
        entries.insert(pair.identity.clone(), pair);
    }

    /// Get a copy of the pair cached for `identity`
    pub fn get(&self, identity: &str) -> Option<KeyPair> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(identity).cloned()
    }

    /// Remove and return the pair cached for `identity`
    pub fn remove(&self, identity: &str) -> Option<KeyPair> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(identity)
    }

    /// Drop every cached pair; private keys are zeroed as they drop
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        debug!(count = entries.len(), "clearing key cache");
        entries.clear();
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureString;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    fn pair(identity: &str, marker: &str) -> KeyPair {
        KeyPair {
            public_key: format!("public-{}", marker),
            private_key: SecureString::new(format!("private-{}", marker)),
            identity: identity.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = KeyCache::new();
        cache.insert(pair("alice@example.com", "1"));
        let cached = cache.get("alice@example.com").unwrap();
        assert_eq!(cached.public_key, "public-1");
        assert!(cache.get("bob@example.com").is_none());
    }

    #[test]
    fn test_insert_overwrites_same_identity() {
        let cache = KeyCache::new();
        cache.insert(pair("alice@example.com", "1"));
        cache.insert(pair("alice@example.com", "2"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("alice@example.com").unwrap().public_key, "public-2");
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = KeyCache::new();
        cache.insert(pair("alice@example.com", "1"));
        cache.insert(pair("bob@example.com", "2"));

        assert!(cache.remove("alice@example.com").is_some());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_for_distinct_identities() {
        let cache = Arc::new(KeyCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.insert(pair(&format!("user{}@example.com", i), "x")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
