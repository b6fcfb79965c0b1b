//! Replay guard delegating to an external key-value store.
//!
//! Atomicity comes from the store's native set-if-absent primitive; expiry
//! from its native TTL (set to 2× the freshness window). The guard never
//! owns the store connection — lifecycle belongs to the caller — so
//! `destroy()` is a no-op.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReplayError;
use crate::guard::{check_fields, now_ms, GuardOptions, ReplayGuard};

/// Minimum operations the external store must expose.
///
/// Implementations handle the actual client protocol (Redis, memcached,
/// etc.); `set_if_absent` must be atomic on the store side.
#[async_trait]
pub trait ReplayStore: Send + Sync {
    /// Set `key` to `value` only if `key` is absent. Returns whether the
    /// value was set.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Set a time-to-live on `key`. Returns whether the key existed.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;
}

/// Store-level error (wraps arbitrary error strings from the store client).
#[derive(Debug, Clone)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Replay guard backed by a shared external store.
pub struct SharedReplayGuard {
    store: Arc<dyn ReplayStore>,
    freshness_window: Duration,
    key_prefix: String,
}

impl SharedReplayGuard {
    pub fn new(store: Arc<dyn ReplayStore>, options: GuardOptions) -> Self {
        Self {
            store,
            freshness_window: options.freshness_window,
            key_prefix: options.key_prefix,
        }
    }
}

#[async_trait]
impl ReplayGuard for SharedReplayGuard {
    async fn validate(
        &self,
        request_id: Option<&str>,
        timestamp_ms: Option<i64>,
    ) -> Result<(), ReplayError> {
        let now = now_ms();
        let id = check_fields(request_id, timestamp_ms, self.freshness_window, now)?;

        let key = format!("{}{}", self.key_prefix, id);
        let inserted = self
            .store
            .set_if_absent(&key, &now.to_string())
            .await
            .map_err(|e| ReplayError::Store(e.message))?;
        if !inserted {
            return Err(ReplayError::ReplayDetected);
        }

        // Store-native expiry hands cleanup to the store itself.
        self.store
            .set_expiry(&key, 2 * self.freshness_window)
            .await
            .map_err(|e| ReplayError::Store(e.message))?;
        Ok(())
    }

    async fn destroy(&self) {}
}
