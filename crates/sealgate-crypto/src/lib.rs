pub mod aead;
pub mod error;
pub mod keypair;
pub mod keywrap;
pub mod types;

pub use aead::{generate_iv, generate_session_key, open, open_bytes, seal, seal_bytes};
pub use error::CryptoError;
pub use keypair::{
    generate_default_keypair, generate_keypair, load_private_key_pem, load_public_key_pem,
    KeyPairPem,
};
pub use keywrap::{unwrap_session_key, wrap_session_key};
pub use types::{IV_LENGTH, RSA_KEY_BITS, SESSION_KEY_LENGTH, TAG_LENGTH};

// Re-exported so downstream crates name the same key types.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
