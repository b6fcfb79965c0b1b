//! Client-side envelope orchestrator.
//!
//! Mints a fresh session key per request (body path) or per GET exchange
//! (header path), wraps it under the server's public key, and opens sealed
//! responses. Because `seal_get` generates a new key every call, a
//! header-path key is never reused across exchanges — the precondition the
//! server's IV-echoing response depends on.

use serde_json::Value;
use zeroize::Zeroize;

use sealgate_crypto::{
    generate_iv, generate_session_key, open, seal, wrap_session_key, RsaPublicKey,
    SESSION_KEY_LENGTH,
};

use crate::error::EnvelopeError;
use crate::wire::{b64_decode, b64_encode, decode_iv, EnvelopeHeaders, RequestEnvelope, ResponseEnvelope};

/// Client half of a request/response exchange. Holds the session key needed
/// to open the response; zeroized on drop.
pub struct ClientSession {
    key: [u8; SESSION_KEY_LENGTH],
    /// Request id sent on the body path, `None` on the header path.
    pub request_id: Option<String>,
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Client-side orchestrator bound to the server's public key.
pub struct EnvelopeClient {
    public_key: RsaPublicKey,
}

impl EnvelopeClient {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    /// Seal a mutating request body. Fresh key, fresh IV, fresh request id,
    /// current timestamp.
    pub fn seal_request(
        &self,
        value: &Value,
    ) -> Result<(RequestEnvelope, ClientSession), EnvelopeError> {
        let key = generate_session_key().map_err(EnvelopeError::Crypto)?;
        let iv = generate_iv().map_err(EnvelopeError::Crypto)?;
        let wrapped = wrap_session_key(&key, &self.public_key)?;
        let sealed = seal(value, &key, &iv)?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp_millis();

        let envelope = RequestEnvelope {
            key: b64_encode(&wrapped),
            payload: b64_encode(&sealed),
            iv: b64_encode(&iv),
            request_id: Some(request_id.clone()),
            timestamp: Some(timestamp),
        };
        let session = ClientSession {
            key,
            request_id: Some(request_id),
        };
        Ok((envelope, session))
    }

    /// Produce the header fields for an encrypted GET. A new session key is
    /// minted per call; never reuse the returned headers across requests.
    pub fn seal_get(&self) -> Result<(EnvelopeHeaders, ClientSession), EnvelopeError> {
        let key = generate_session_key().map_err(EnvelopeError::Crypto)?;
        let iv = generate_iv().map_err(EnvelopeError::Crypto)?;
        let wrapped = wrap_session_key(&key, &self.public_key)?;

        let headers = EnvelopeHeaders {
            marker: Some("1".to_string()),
            key: Some(b64_encode(&wrapped)),
            iv: Some(b64_encode(&iv)),
        };
        let session = ClientSession {
            key,
            request_id: None,
        };
        Ok((headers, session))
    }

    /// Open a sealed response with the session key from the matching
    /// request.
    pub fn open_response(
        &self,
        session: &ClientSession,
        envelope: &ResponseEnvelope,
    ) -> Result<Value, EnvelopeError> {
        let iv = decode_iv(&envelope.iv)?;
        let sealed = b64_decode(&envelope.payload)?;
        Ok(open(&sealed, &session.key, &iv)?)
    }
}
