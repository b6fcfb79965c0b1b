use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Invalid IV length: expected {expected} bytes, got {got}")]
    InvalidIvLength { expected: usize, got: usize },

    #[error("Sealed payload too short")]
    PayloadTooShort,

    #[error("Authentication failed")]
    AuthenticationFailure,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Deliberately detail-free: callers must not be able to distinguish a
    /// wrong key from corrupted ciphertext or an OAEP padding failure.
    #[error("Key unwrap failed")]
    KeyUnwrapFailure,

    #[error("Key wrap failed: {0}")]
    KeyWrapFailed(String),

    #[error("Key generation failed: {0}")]
    KeyGenFailed(String),

    #[error("Key decode failed: {0}")]
    KeyDecodeFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
