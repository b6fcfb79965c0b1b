//! Shared constants for the envelope primitives.

/// Session key length in bytes (AES-256).
pub const SESSION_KEY_LENGTH: usize = 32;

/// AES-GCM IV length in bytes.
pub const IV_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// RSA modulus size for generated key pairs.
pub const RSA_KEY_BITS: usize = 2048;
