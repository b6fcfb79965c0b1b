//! Replay guard contract and shared validation steps.
//!
//! Both backends run the same three checks, in order:
//! 1. `MissingFields` — request id absent/empty or timestamp absent.
//! 2. `Expired` — timestamp diverges from guard-observed now by more than
//!    the freshness window (either direction).
//! 3. Atomic check-and-mark — `ReplayDetected` if the id was already seen.
//!
//! Step 3 is the correctness-critical property: two concurrent validations
//! of the same id must never both succeed.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReplayError;

/// Default freshness window: 30 seconds.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_millis(30_000);

/// Default sweep interval for the local backend: 60 seconds.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(60_000);

/// Default key prefix for the shared backend.
pub const DEFAULT_KEY_PREFIX: &str = "replay:";

/// At-most-once acceptance of a (request id, timestamp) pair.
#[async_trait]
pub trait ReplayGuard: Send + Sync {
    /// Validate a request. `Ok(())` marks the id as seen.
    async fn validate(
        &self,
        request_id: Option<&str>,
        timestamp_ms: Option<i64>,
    ) -> Result<(), ReplayError>;

    /// Release background resources. Local backend stops its sweep and
    /// discards records; shared backend is a no-op (the store owns expiry).
    async fn destroy(&self);
}

/// Configuration shared by both backends.
#[derive(Debug, Clone)]
pub struct GuardOptions {
    /// Maximum allowed divergence between a presented timestamp and now.
    pub freshness_window: Duration,
    /// How often the local backend sweeps expired records.
    pub sweep_interval: Duration,
    /// Key prefix for the shared backend.
    pub key_prefix: String,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Current time in milliseconds since the epoch.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Steps 1–2: field presence and freshness against the given `now`.
pub(crate) fn check_fields<'a>(
    request_id: Option<&'a str>,
    timestamp_ms: Option<i64>,
    window: Duration,
    now: i64,
) -> Result<&'a str, ReplayError> {
    let id = match request_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ReplayError::MissingFields),
    };
    let timestamp = timestamp_ms.ok_or(ReplayError::MissingFields)?;

    let window_ms = window.as_millis() as i64;
    if (now - timestamp).abs() > window_ms {
        return Err(ReplayError::Expired);
    }
    Ok(id)
}
