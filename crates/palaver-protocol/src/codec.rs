//! Codec trait and implementations for serializing message payloads.
//!
//! A codec converts between a message's fields and raw payload bytes. It is
//! deliberately ignorant of framing: which bytes carry the header and where
//! the payload starts is the frame layout's business (see
//! [`frame`](crate::frame)), so payload-encoding choice and wire-layout
//! choice stay orthogonal.
//!
//! [`JsonCodec`] is the reference encoding (human-readable, easy to inspect
//! on the wire). A binary codec can be swapped in without touching the
//! catalog or the layouts.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes message payloads to bytes and decodes them back.
///
/// `Send + Sync + 'static` because the catalog holding the codec is shared
/// across threads for the life of the process. `DeserializeOwned` (rather
/// than borrowing `Deserialize`) because decoded messages outlive the
/// receive buffer they were parsed from.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a payload value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes payload bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or do not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use palaver_protocol::{Codec, JsonCodec};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Chat { body: String }
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Chat { body: "hi".into() }).unwrap();
/// let decoded: Chat = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.body, "hi");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
