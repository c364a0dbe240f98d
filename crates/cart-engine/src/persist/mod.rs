//! Durable cart snapshots.
//!
//! The whole [`CartState`] is written under one fixed key on every transition
//! and read back once at startup. Anything that cannot be decoded into a
//! valid state is treated as if nothing had been saved.

mod writer;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use cart_kv::{Cache, KeyValueStore};
use serde::{Deserialize, Serialize};

use crate::cart::CartState;
use crate::error::CartError;

pub(crate) use writer::{run_writer, WriteCommand, WriteQueue};

/// Version tag of the snapshot envelope.
pub const SNAPSHOT_SCHEMA: u32 = 1;

/// Stored record: the state plus enough metadata to reject foreign data.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema: u32,
    /// Unix timestamp of the write.
    saved_at: u64,
    state: T,
}

/// Reads and writes cart snapshots through a [`KeyValueStore`].
#[derive(Clone)]
pub struct CartPersistence {
    cache: Cache,
    key: String,
}

impl CartPersistence {
    /// Persist under `key` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            cache: Cache::new(store),
            key: key.into(),
        }
    }

    /// The storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Upsert the full state.
    pub async fn save(&self, state: &CartState) -> Result<(), CartError> {
        let envelope = Envelope {
            schema: SNAPSHOT_SCHEMA,
            saved_at: unix_now(),
            state,
        };
        self.cache.set(&self.key, &envelope).await?;
        Ok(())
    }

    /// Read the snapshot, reporting why it is unusable if it is.
    pub async fn try_load(&self) -> Result<Option<CartState>, CartError> {
        let Some(envelope) = self.cache.get::<Envelope<CartState>>(&self.key).await? else {
            return Ok(None);
        };
        if envelope.schema != SNAPSHOT_SCHEMA {
            return Err(CartError::CorruptSnapshot(format!(
                "unsupported schema {}",
                envelope.schema
            )));
        }
        envelope.state.check_invariants()?;
        Ok(Some(envelope.state))
    }

    /// Read the snapshot, failing closed.
    ///
    /// Missing, undecodable or invalid snapshots, and read errors, all yield
    /// `None`.
    pub async fn load(&self) -> Option<CartState> {
        match self.try_load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unreadable cart snapshot");
                None
            }
        }
    }

    /// Delete the snapshot.
    pub async fn remove(&self) -> Result<(), CartError> {
        self.cache.delete(&self.key).await?;
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
