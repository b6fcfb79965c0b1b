//! Error taxonomy and the outward failure translation.
//!
//! [`EnvelopeError`] keeps full fidelity for logging and the observer hook.
//! [`EnvelopeFailure`] is what crosses the transport boundary: replay-guard
//! rejections stay distinct (client-correctable), every decryption-adjacent
//! failure collapses into one generic variant so the server cannot be used
//! as a decryption oracle, and anything unexpected becomes `Internal`.

use thiserror::Error;

use sealgate_crypto::CryptoError;
use sealgate_replay::ReplayError;

/// Internal, full-fidelity error. Never serialized outward.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Missing encryption headers")]
    MissingHeaders,

    #[error("Base64 decode failed: {0}")]
    Base64(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}

/// Caller-visible failure. This is the entire outward error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvelopeFailure {
    #[error("Request is missing requestId or timestamp")]
    MissingFields,

    #[error("Request timestamp is outside the freshness window")]
    Expired,

    #[error("Request has already been processed")]
    ReplayDetected,

    #[error("Missing encryption headers")]
    MissingHeaders,

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Internal error")]
    Internal,
}

/// Collapse an internal error into its outward shape.
pub(crate) fn translate(err: &EnvelopeError) -> EnvelopeFailure {
    match err {
        EnvelopeError::MissingHeaders => EnvelopeFailure::MissingHeaders,
        EnvelopeError::Base64(_) => EnvelopeFailure::DecryptionFailed,
        EnvelopeError::Replay(replay) => match replay {
            ReplayError::MissingFields => EnvelopeFailure::MissingFields,
            ReplayError::Expired => EnvelopeFailure::Expired,
            ReplayError::ReplayDetected => EnvelopeFailure::ReplayDetected,
            ReplayError::Store(_) => EnvelopeFailure::Internal,
        },
        EnvelopeError::Crypto(crypto) => match crypto {
            // Anything that distinguishes "wrong key" from "tampered tag"
            // from "bad padding" must collapse here.
            CryptoError::PayloadTooShort
            | CryptoError::AuthenticationFailure
            | CryptoError::MalformedPayload(_)
            | CryptoError::KeyUnwrapFailure
            | CryptoError::InvalidIvLength { .. }
            | CryptoError::InvalidKeyLength { .. } => EnvelopeFailure::DecryptionFailed,
            _ => EnvelopeFailure::Internal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_failures_are_indistinguishable() {
        let errors = [
            EnvelopeError::Crypto(CryptoError::PayloadTooShort),
            EnvelopeError::Crypto(CryptoError::AuthenticationFailure),
            EnvelopeError::Crypto(CryptoError::KeyUnwrapFailure),
            EnvelopeError::Crypto(CryptoError::MalformedPayload("x".into())),
            EnvelopeError::Base64("bad".into()),
        ];
        for err in &errors {
            assert_eq!(translate(err), EnvelopeFailure::DecryptionFailed);
        }
    }

    #[test]
    fn replay_rejections_stay_distinct() {
        assert_eq!(
            translate(&EnvelopeError::Replay(ReplayError::MissingFields)),
            EnvelopeFailure::MissingFields
        );
        assert_eq!(
            translate(&EnvelopeError::Replay(ReplayError::Expired)),
            EnvelopeFailure::Expired
        );
        assert_eq!(
            translate(&EnvelopeError::Replay(ReplayError::ReplayDetected)),
            EnvelopeFailure::ReplayDetected
        );
    }

    #[test]
    fn store_failure_is_internal() {
        assert_eq!(
            translate(&EnvelopeError::Replay(ReplayError::Store("down".into()))),
            EnvelopeFailure::Internal
        );
    }

    #[test]
    fn unexpected_crypto_failure_is_internal() {
        assert_eq!(
            translate(&EnvelopeError::Crypto(CryptoError::SerializationError(
                "x".into()
            ))),
            EnvelopeFailure::Internal
        );
    }
}
