//! Wire shapes: request envelope, response envelope, GET header fields.
//!
//! All binary fields travel base64-encoded (standard alphabet). An envelope
//! is fully self-describing: wrapped key + IV + sealed payload, nothing
//! hidden beyond them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sealgate_crypto::{CryptoError, IV_LENGTH};

use crate::error::EnvelopeError;

/// Response envelope version tag.
pub const ENVELOPE_VERSION: &str = "v1";

/// Header marking a GET request as encrypted (value `"1"`).
pub const HEADER_MARKER: &str = "x-encrypted";
/// Header carrying the base64 RSA-OAEP-wrapped session key.
pub const HEADER_KEY: &str = "x-encrypted-key";
/// Header carrying the base64 12-byte IV.
pub const HEADER_IV: &str = "x-encrypted-iv";

/// Body-path request envelope.
///
/// Accepted flat or nested one level under a `data` field. `requestId` and
/// `timestamp` are optional on the wire; the replay guard rejects their
/// absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Base64 RSA-OAEP-wrapped 32-byte session key.
    pub key: String,
    /// Base64 AES-256-GCM ciphertext‖tag.
    pub payload: String,
    /// Base64 12-byte IV.
    pub iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RequestEnvelope {
    /// Extract an envelope from a request body, trying the flat shape first
    /// and then `{"data": {...}}`. Returns `None` when the body has no
    /// recognizable envelope shape (the request passes through unencrypted).
    pub fn extract(body: &Value) -> Option<Self> {
        if has_envelope_shape(body) {
            return serde_json::from_value(body.clone()).ok();
        }
        let nested = body.get("data")?;
        if has_envelope_shape(nested) {
            return serde_json::from_value(nested.clone()).ok();
        }
        None
    }

    /// Serialize to a flat JSON body.
    pub fn to_body(&self) -> Value {
        // Struct serialization to Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Serialize nested under a `data` field.
    pub fn to_nested_body(&self) -> Value {
        serde_json::json!({ "data": self.to_body() })
    }
}

fn has_envelope_shape(value: &Value) -> bool {
    value.get("key").map_or(false, Value::is_string)
        && value.get("payload").map_or(false, Value::is_string)
        && value.get("iv").map_or(false, Value::is_string)
}

/// Response envelope, both paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub encrypted: bool,
    pub version: String,
    /// Base64 AES-256-GCM ciphertext‖tag.
    pub payload: String,
    /// Base64 12-byte IV.
    pub iv: String,
    /// Echoed request id, body path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Side-channel fields of the GET header envelope, as read from (or written
/// to) transport headers.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeHeaders {
    /// Value of [`HEADER_MARKER`], if present.
    pub marker: Option<String>,
    /// Value of [`HEADER_KEY`], if present.
    pub key: Option<String>,
    /// Value of [`HEADER_IV`], if present.
    pub iv: Option<String>,
}

impl EnvelopeHeaders {
    /// Whether the encryption marker is set.
    pub fn is_marked(&self) -> bool {
        self.marker.as_deref() == Some("1")
    }
}

/// Encode bytes with the standard base64 alphabet.
pub fn b64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard-alphabet base64.
pub fn b64_decode(encoded: &str) -> Result<Vec<u8>, EnvelopeError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| EnvelopeError::Base64(e.to_string()))
}

/// Decode a base64 IV field and check its length.
pub fn decode_iv(encoded: &str) -> Result<[u8; IV_LENGTH], EnvelopeError> {
    let bytes = b64_decode(encoded)?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| EnvelopeError::Crypto(CryptoError::InvalidIvLength {
            expected: IV_LENGTH,
            got,
        }))
}
