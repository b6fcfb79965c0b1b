//! AES-256-GCM sealing of JSON payloads.
//!
//! Sealed blob layout: [N bytes: ciphertext][16 bytes: tag]. The IV travels
//! in the envelope, never inside the blob, so `seal`/`open` take it
//! explicitly. An IV must never be reused with the same key for two
//! different plaintexts.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use serde_json::Value;

use crate::error::CryptoError;
use crate::types::{IV_LENGTH, SESSION_KEY_LENGTH, TAG_LENGTH};

/// Generate a random 32-byte session key.
pub fn generate_session_key() -> Result<[u8; SESSION_KEY_LENGTH], CryptoError> {
    let mut key = [0u8; SESSION_KEY_LENGTH];
    getrandom::getrandom(&mut key).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(key)
}

/// Generate a random 12-byte IV for AES-GCM.
pub fn generate_iv() -> Result<[u8; IV_LENGTH], CryptoError> {
    let mut iv = [0u8; IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(iv)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != SESSION_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: SESSION_KEY_LENGTH,
            got: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

fn check_iv(iv: &[u8]) -> Result<(), CryptoError> {
    if iv.len() != IV_LENGTH {
        return Err(CryptoError::InvalidIvLength {
            expected: IV_LENGTH,
            got: iv.len(),
        });
    }
    Ok(())
}

/// Seal a JSON value under a session key and IV.
///
/// Returns ciphertext with the 16-byte tag appended.
pub fn seal(value: &Value, key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let plaintext =
        serde_json::to_vec(value).map_err(|e| CryptoError::SerializationError(e.to_string()))?;
    seal_bytes(&plaintext, key, iv)
}

/// Open a sealed blob and decode the plaintext as JSON.
pub fn open(sealed: &[u8], key: &[u8], iv: &[u8]) -> Result<Value, CryptoError> {
    let plaintext = open_bytes(sealed, key, iv)?;
    serde_json::from_slice(&plaintext).map_err(|e| CryptoError::MalformedPayload(e.to_string()))
}

/// Seal raw bytes with AES-256-GCM. Returns ciphertext‖tag.
pub fn seal_bytes(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = build_cipher(key)?;
    check_iv(iv)?;
    let nonce = Nonce::from_slice(iv);
    cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Open raw bytes sealed with AES-256-GCM (expects ciphertext‖tag).
///
/// Fails closed on any mutation of ciphertext or tag; the error carries no
/// detail about what was wrong.
pub fn open_bytes(sealed: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < TAG_LENGTH {
        return Err(CryptoError::PayloadTooShort);
    }
    let cipher = build_cipher(key)?;
    check_iv(iv)?;
    let nonce = Nonce::from_slice(iv);
    cipher
        .decrypt(nonce, sealed)
        .map_err(|_| CryptoError::AuthenticationFailure)
}
