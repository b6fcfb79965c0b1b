//! In-process replay guard backed by a mutex-guarded map.
//!
//! Records map request id → first-seen timestamp (ms). Check-and-mark is a
//! single entry-API operation under a short lock, so concurrent validations
//! of the same id cannot both succeed. A background sweep removes records
//! older than 2× the freshness window; the sweep collects expired ids in
//! one short pass and removes them in small batches so validations are
//! never blocked behind a whole-sweep lock. TTL is a resource bound, not a
//! security boundary.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ReplayError;
use crate::guard::{check_fields, now_ms, GuardOptions, ReplayGuard};

/// Batch size for incremental sweep removal.
const SWEEP_BATCH: usize = 64;

type RecordMap = Arc<Mutex<HashMap<String, i64>>>;

/// Replay guard holding records in process memory.
///
/// Must be constructed inside a Tokio runtime (owns a background sweep
/// task). Call [`ReplayGuard::destroy`] to stop the sweep on shutdown.
pub struct LocalReplayGuard {
    records: RecordMap,
    freshness_window: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl LocalReplayGuard {
    pub fn new(options: GuardOptions) -> Self {
        let records: RecordMap = Arc::new(Mutex::new(HashMap::new()));
        let sweeper = spawn_sweeper(
            Arc::clone(&records),
            options.freshness_window,
            options.sweep_interval,
        );
        Self {
            records,
            freshness_window: options.freshness_window,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Number of live records (test and diagnostics hook).
    pub fn record_count(&self) -> usize {
        self.records.lock().len()
    }
}

impl Default for LocalReplayGuard {
    fn default() -> Self {
        Self::new(GuardOptions::default())
    }
}

#[async_trait]
impl ReplayGuard for LocalReplayGuard {
    async fn validate(
        &self,
        request_id: Option<&str>,
        timestamp_ms: Option<i64>,
    ) -> Result<(), ReplayError> {
        let now = now_ms();
        let id = check_fields(request_id, timestamp_ms, self.freshness_window, now)?;

        // Atomic check-and-mark: one lock, one entry operation.
        let mut records = self.records.lock();
        match records.entry(id.to_string()) {
            Entry::Occupied(_) => Err(ReplayError::ReplayDetected),
            Entry::Vacant(slot) => {
                slot.insert(now);
                Ok(())
            }
        }
    }

    async fn destroy(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
        self.records.lock().clear();
    }
}

impl Drop for LocalReplayGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
    }
}

fn spawn_sweeper(
    records: RecordMap,
    freshness_window: Duration,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    let horizon_ms = 2 * freshness_window.as_millis() as i64;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let cutoff = now_ms() - horizon_ms;
            let expired: Vec<String> = {
                let records = records.lock();
                records
                    .iter()
                    .filter(|(_, first_seen)| **first_seen < cutoff)
                    .map(|(id, _)| id.clone())
                    .collect()
            };
            if expired.is_empty() {
                continue;
            }
            for chunk in expired.chunks(SWEEP_BATCH) {
                let mut records = records.lock();
                for id in chunk {
                    records.remove(id);
                }
            }
            debug!(removed = expired.len(), "replay guard sweep");
        }
    })
}
