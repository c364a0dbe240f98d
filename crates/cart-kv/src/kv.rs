//! Key-value store trait and a typed wrapper with automatic serialization.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::StoreError;

/// Raw asynchronous key-value store.
///
/// Values are opaque bytes. Every `set` is an upsert of the whole value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the bytes stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List all keys currently present.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Type-safe cache over any [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
///
/// # Example
///
/// ```rust,ignore
/// let cache = Cache::new(Arc::new(MemoryStore::new()));
/// cache.set("storefront:cart", &state).await?;
/// let state: Option<CartState> = cache.get("storefront:cart").await?;
/// ```
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
}

impl Cache {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist, and an error if the stored
    /// bytes do not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(key).await? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes).await
    }

    /// Delete a value from the cache.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.store.delete(key).await
    }

    /// Check if a key exists in the cache.
    pub async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.store.exists(key).await
    }
}

/// Helper to build storage keys with namespacing.
///
/// # Example
///
/// ```rust
/// let key = cart_kv::cache_key!("storefront", "cart");
/// assert_eq!(key, "storefront:cart");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
