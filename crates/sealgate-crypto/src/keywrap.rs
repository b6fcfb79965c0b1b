//! RSA-OAEP session-key wrapping.
//!
//! Each request mints a random 32-byte session key; the key travels wrapped
//! under the server's RSA public key. OAEP with SHA-256, no extra padding.
//! A 2048-bit modulus gives a fixed 256-byte wrapped output.

use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::types::SESSION_KEY_LENGTH;

/// Wrap a session key under an RSA public key.
pub fn wrap_session_key(key: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
    if key.len() != SESSION_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: SESSION_KEY_LENGTH,
            got: key.len(),
        });
    }
    let mut rng = OsRng;
    public_key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), key)
        .map_err(|e| CryptoError::KeyWrapFailed(e.to_string()))
}

/// Unwrap a session key with an RSA private key.
///
/// Every failure mode (wrong key, corrupted ciphertext, OAEP padding check,
/// wrong plaintext length) collapses into [`CryptoError::KeyUnwrapFailure`]
/// so the caller cannot be used as a padding oracle.
pub fn unwrap_session_key(
    wrapped: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<[u8; SESSION_KEY_LENGTH], CryptoError> {
    let mut plaintext = private_key
        .decrypt(Oaep::new::<Sha256>(), wrapped)
        .map_err(|_| CryptoError::KeyUnwrapFailure)?;

    let result: Result<[u8; SESSION_KEY_LENGTH], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    result.map_err(|_| CryptoError::KeyUnwrapFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aead::generate_session_key;
    use crate::keypair::test_keypair;

    #[test]
    fn wrap_unwrap_round_trip() {
        let (private_key, public_key) = test_keypair();
        let key = generate_session_key().unwrap();
        let wrapped = wrap_session_key(&key, public_key).unwrap();
        let unwrapped = unwrap_session_key(&wrapped, private_key).unwrap();
        assert_eq!(unwrapped, key);
    }

    #[test]
    fn wrapped_output_matches_modulus_size() {
        let (_, public_key) = test_keypair();
        let key = generate_session_key().unwrap();
        let wrapped = wrap_session_key(&key, public_key).unwrap();
        assert_eq!(wrapped.len(), 256);
    }

    #[test]
    fn mismatched_keypair_fails() {
        let (_, public_key) = test_keypair();
        let (other_private, _) = test_keypair_b();
        let key = generate_session_key().unwrap();
        let wrapped = wrap_session_key(&key, public_key).unwrap();
        let err = unwrap_session_key(&wrapped, other_private).unwrap_err();
        assert!(matches!(err, CryptoError::KeyUnwrapFailure));
    }

    #[test]
    fn corrupted_ciphertext_fails() {
        let (private_key, public_key) = test_keypair();
        let key = generate_session_key().unwrap();
        let mut wrapped = wrap_session_key(&key, public_key).unwrap();
        wrapped[128] ^= 0xff;
        let err = unwrap_session_key(&wrapped, private_key).unwrap_err();
        assert!(matches!(err, CryptoError::KeyUnwrapFailure));
    }

    #[test]
    fn rejects_short_session_key() {
        let (_, public_key) = test_keypair();
        let err = wrap_session_key(&[0u8; 16], public_key).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
    }

    #[test]
    fn failure_carries_no_detail() {
        let (private_key, _) = test_keypair();
        let err = unwrap_session_key(&[0u8; 256], private_key).unwrap_err();
        assert_eq!(err.to_string(), "Key unwrap failed");
    }

    /// Second cached pair for mismatch tests.
    fn test_keypair_b() -> (&'static RsaPrivateKey, &'static RsaPublicKey) {
        use std::sync::OnceLock;
        static PAIR: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
        let (private_key, public_key) = PAIR.get_or_init(|| {
            let mut rng = OsRng;
            let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
            let public_key = RsaPublicKey::from(&private_key);
            (private_key, public_key)
        });
        (private_key, public_key)
    }
}
