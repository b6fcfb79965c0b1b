pub mod error;
pub mod guard;
pub mod local;
pub mod shared;

pub use error::ReplayError;
pub use guard::{
    GuardOptions, ReplayGuard, DEFAULT_FRESHNESS_WINDOW, DEFAULT_KEY_PREFIX,
    DEFAULT_SWEEP_INTERVAL,
};
pub use local::LocalReplayGuard;
pub use shared::{ReplayStore, SharedReplayGuard, StoreError};
