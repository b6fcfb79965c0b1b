//! Server-side envelope orchestrator.
//!
//! Request pipeline, body path: extract envelope → replay guard → unwrap
//! key → open payload. The guard runs strictly first so a replayed envelope
//! never costs an RSA decrypt. Header path (GET): unwrap key from headers,
//! no guard (idempotent reads are exempt by design), body untouched.
//! Anything without an envelope shape passes through unmodified.
//!
//! Response pipeline: no session → response untouched. Header path seals
//! with the inbound IV (the `v1` one-key-one-GET contract; see client).
//! Body path seals with a fresh IV and echoes the request id.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use zeroize::Zeroize;

use sealgate_crypto::{
    generate_iv, open, seal, unwrap_session_key, RsaPrivateKey, IV_LENGTH, SESSION_KEY_LENGTH,
};
use sealgate_replay::ReplayGuard;

use crate::error::{translate, EnvelopeError, EnvelopeFailure};
use crate::wire::{
    b64_decode, b64_encode, decode_iv, EnvelopeHeaders, RequestEnvelope, ResponseEnvelope,
    ENVELOPE_VERSION,
};

/// Observer invoked with every internal error before outward translation.
/// For logging/metrics only; cannot alter the response.
pub type ErrorObserver = Arc<dyn Fn(&EnvelopeError) + Send + Sync>;

/// A request as the transport adapter hands it over: method name, the
/// envelope side-channel headers, and the parsed JSON body (if any).
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: String,
    pub headers: EnvelopeHeaders,
    pub body: Option<Value>,
}

/// How the response IV is chosen.
enum IvMode {
    /// Header path: reuse the caller-supplied IV.
    Reuse([u8; IV_LENGTH]),
    /// Body path: mint a fresh IV per response.
    Fresh,
}

/// Per-request session carried from the request phase to the response
/// phase. Key material is zeroized on drop.
pub struct ResponseSession {
    key: [u8; SESSION_KEY_LENGTH],
    iv_mode: IvMode,
    request_id: Option<String>,
}

impl ResponseSession {
    fn reuse_iv(key: [u8; SESSION_KEY_LENGTH], iv: [u8; IV_LENGTH]) -> Self {
        Self {
            key,
            iv_mode: IvMode::Reuse(iv),
            request_id: None,
        }
    }

    fn fresh_iv(key: [u8; SESSION_KEY_LENGTH], request_id: Option<String>) -> Self {
        Self {
            key,
            iv_mode: IvMode::Fresh,
            request_id,
        }
    }

    /// Request id to echo in the response, body path only.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl Drop for ResponseSession {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for ResponseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSession")
            .field("key", &"<redacted>")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// Outcome of the request phase.
#[derive(Debug)]
pub struct OpenedRequest {
    /// Plaintext body (body path), original body (header path and
    /// pass-through), or `None` for bodyless requests.
    pub body: Option<Value>,
    /// Present when the response must be sealed.
    pub session: Option<ResponseSession>,
}

/// Constructor options for [`EnvelopeServer`].
pub struct EnvelopeServerOptions {
    pub private_key: RsaPrivateKey,
    pub guard: Arc<dyn ReplayGuard>,
    /// Called with each internal error before translation.
    pub on_error: Option<ErrorObserver>,
}

/// Server-side orchestrator. Immutable after construction; safe to share
/// across concurrent requests.
pub struct EnvelopeServer {
    private_key: RsaPrivateKey,
    guard: Arc<dyn ReplayGuard>,
    on_error: Option<ErrorObserver>,
}

impl EnvelopeServer {
    pub fn new(options: EnvelopeServerOptions) -> Self {
        Self {
            private_key: options.private_key,
            guard: options.guard,
            on_error: options.on_error,
        }
    }

    /// Process an inbound request. On the body path the returned body is
    /// the decrypted plaintext; otherwise the body is forwarded as-is.
    pub async fn open_request(
        &self,
        request: &InboundRequest,
    ) -> Result<OpenedRequest, EnvelopeFailure> {
        self.open_request_inner(request)
            .await
            .map_err(|err| self.report(err))
    }

    /// Seal an outbound value under the request's session. `None` session
    /// means the response passes through unsealed (mixed route sets).
    pub fn seal_response(
        &self,
        session: Option<&ResponseSession>,
        value: &Value,
    ) -> Result<Option<ResponseEnvelope>, EnvelopeFailure> {
        let Some(session) = session else {
            return Ok(None);
        };
        self.seal_response_inner(session, value)
            .map(Some)
            .map_err(|err| self.report(err))
    }

    async fn open_request_inner(
        &self,
        request: &InboundRequest,
    ) -> Result<OpenedRequest, EnvelopeError> {
        if request.method.eq_ignore_ascii_case("GET") && request.headers.is_marked() {
            return self.open_header_path(request);
        }
        let Some(body) = &request.body else {
            return Ok(OpenedRequest {
                body: None,
                session: None,
            });
        };
        let Some(envelope) = RequestEnvelope::extract(body) else {
            return Ok(OpenedRequest {
                body: Some(body.clone()),
                session: None,
            });
        };
        self.open_body_path(envelope).await
    }

    fn open_header_path(&self, request: &InboundRequest) -> Result<OpenedRequest, EnvelopeError> {
        let key_b64 = request
            .headers
            .key
            .as_deref()
            .ok_or(EnvelopeError::MissingHeaders)?;
        let iv_b64 = request
            .headers
            .iv
            .as_deref()
            .ok_or(EnvelopeError::MissingHeaders)?;

        let wrapped = b64_decode(key_b64)?;
        let iv = decode_iv(iv_b64)?;
        let key = unwrap_session_key(&wrapped, &self.private_key)?;

        Ok(OpenedRequest {
            body: request.body.clone(),
            session: Some(ResponseSession::reuse_iv(key, iv)),
        })
    }

    async fn open_body_path(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<OpenedRequest, EnvelopeError> {
        // Replay validation first: no decryption work for rejected replays.
        self.guard
            .validate(envelope.request_id.as_deref(), envelope.timestamp)
            .await?;

        let wrapped = b64_decode(&envelope.key)?;
        let key = unwrap_session_key(&wrapped, &self.private_key)?;
        let iv = decode_iv(&envelope.iv)?;
        let sealed = b64_decode(&envelope.payload)?;
        let plaintext = open(&sealed, &key, &iv)?;

        Ok(OpenedRequest {
            body: Some(plaintext),
            session: Some(ResponseSession::fresh_iv(key, envelope.request_id)),
        })
    }

    fn seal_response_inner(
        &self,
        session: &ResponseSession,
        value: &Value,
    ) -> Result<ResponseEnvelope, EnvelopeError> {
        let (iv, request_id) = match &session.iv_mode {
            IvMode::Reuse(iv) => (*iv, None),
            IvMode::Fresh => (generate_iv()?, session.request_id.clone()),
        };
        let sealed = seal(value, &session.key, &iv)?;

        Ok(ResponseEnvelope {
            encrypted: true,
            version: ENVELOPE_VERSION.to_string(),
            payload: b64_encode(&sealed),
            iv: b64_encode(&iv),
            request_id,
        })
    }

    fn report(&self, err: EnvelopeError) -> EnvelopeFailure {
        if let Some(observer) = &self.on_error {
            observer(&err);
        }
        let failure = translate(&err);
        debug!(error = %err, outward = %failure, "envelope request rejected");
        failure
    }
}
