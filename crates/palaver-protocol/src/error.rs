//! Error types for the protocol layer.
//!
//! Every failure here is deterministic: the core operates on in-memory,
//! already-available data, so the same inputs always produce the same error.
//! Nothing is silently defaulted — the only deliberate no-ops in the
//! protocol (publishing with no subscribers, unsubscribing an absent
//! registration, bulk-registration collision skips) never reach this enum.

/// Errors that can occur while associating, framing, or (de)serializing
/// messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A frame lookup named a header with no associated variant.
    #[error("no message variant associated with header '{0}'")]
    UnknownHeader(String),

    /// An encode or lookup named a type with no associated header.
    #[error("message type {0} has no associated header")]
    UnknownVariant(&'static str),

    /// The raw bytes violate the active frame layout's structural rules:
    /// a truncated or unreadable length prefix, a non-positive declared
    /// header length, a header that overruns the buffer, or header bytes
    /// that are not valid UTF-8.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A registration supplied an empty header for the named type.
    #[error("empty header supplied for {0}")]
    EmptyHeader(&'static str),

    /// The value handed to an encode path is not the variant registered
    /// under its entry. Only reachable if a catalog entry and a message
    /// disagree about their concrete type.
    #[error("value is not the registered variant {0}")]
    VariantMismatch(&'static str),

    /// Payload serialization failed.
    #[cfg(feature = "json")]
    #[error("payload encode failed: {0}")]
    Encode(serde_json::Error),

    /// Payload bytes failed to deserialize into the resolved variant.
    /// Structurally this belongs to the malformed-frame family — the frame
    /// split cleanly but its payload does not describe the registered type.
    #[cfg(feature = "json")]
    #[error("payload decode failed: {0}")]
    Decode(serde_json::Error),
}
