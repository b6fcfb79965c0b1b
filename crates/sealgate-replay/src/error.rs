use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Request is missing requestId or timestamp")]
    MissingFields,

    #[error("Request timestamp is outside the freshness window")]
    Expired,

    #[error("Request has already been processed")]
    ReplayDetected,

    /// Backend storage failure — an infrastructure error, never a verdict.
    #[error("Replay store failure: {0}")]
    Store(String),
}
