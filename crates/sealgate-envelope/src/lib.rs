//! Transport-independent hybrid encryption envelopes.
//!
//! A random 32-byte session key seals each payload with AES-256-GCM; the
//! key travels RSA-OAEP-wrapped inside the envelope. Mutating requests
//! carry a request id + timestamp checked by a replay guard before any
//! decryption work. Two request shapes: body-carried (mutations) and
//! header-carried (GET), plus a matching response envelope.

pub mod client;
pub mod error;
pub mod server;
pub mod wire;

pub use client::{ClientSession, EnvelopeClient};
pub use error::{EnvelopeError, EnvelopeFailure};
pub use server::{
    EnvelopeServer, EnvelopeServerOptions, ErrorObserver, InboundRequest, OpenedRequest,
    ResponseSession,
};
pub use wire::{
    b64_decode, b64_encode, decode_iv, EnvelopeHeaders, RequestEnvelope, ResponseEnvelope,
    ENVELOPE_VERSION, HEADER_IV, HEADER_KEY, HEADER_MARKER,
};
