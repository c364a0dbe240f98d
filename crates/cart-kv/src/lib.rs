//! Async key-value storage boundary for the storefront cart.
//!
//! Provides a small store trait plus a typed wrapper with automatic JSON
//! serialization, so callers deal in their own types instead of bytes.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cart_kv::{cache_key, Cache, FileStore};
//!
//! let store = FileStore::open("/var/lib/storefront").await?;
//! let cache = Cache::new(Arc::new(store));
//!
//! let key = cache_key!("storefront", "cart");
//! cache.set(&key, &cart).await?;
//! let cart: Option<CartState> = cache.get(&key).await?;
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use kv::{Cache, KeyValueStore};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, FileStore, KeyValueStore, MemoryStore, StoreError};
}
