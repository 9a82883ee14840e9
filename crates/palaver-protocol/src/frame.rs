//! Wire frame layouts.
//!
//! A frame is the complete byte sequence for one message: the discriminator
//! encoding plus the serialized payload. The layout implemented here is the
//! length-prefixed header scheme:
//!
//! ```text
//! [4 bytes: little-endian signed 32-bit header byte-length N]
//! [N bytes: UTF-8 header string]
//! [remaining bytes: payload]
//! ```
//!
//! The length field counts the header's UTF-8 *bytes*, not its characters,
//! and is always emitted even for single-digit lengths.
//!
//! Two historical alternatives exist for this protocol — a fixed-width
//! 4-byte integer code and a single-byte code constrained to 0–255. They are
//! not interoperable with the header scheme (the first four bytes mean
//! different things), so this crate deliberately implements exactly one
//! layout and no negotiation between them.

use crate::ProtocolError;

/// Size of the little-endian header-length field, in bytes.
pub const LEN_PREFIX_BYTES: usize = 4;

/// A pluggable wire layout: how a header and a payload become one frame.
///
/// Layouts are object-safe so the catalog can swap them at runtime. A layout
/// never interprets the payload — splitting and joining bytes is its entire
/// job, which keeps it orthogonal to the payload [`Codec`](crate::Codec).
pub trait FrameLayout: Send + Sync + 'static {
    /// Joins a header and payload into a complete frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedFrame`] if the header is empty or
    /// its byte length cannot be represented in the length field.
    fn frame(&self, header: &str, payload: &[u8]) -> Result<Vec<u8>, ProtocolError>;

    /// Splits a complete frame into its header and payload.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedFrame`] on any structural
    /// violation; never reads past the end of `frame`.
    fn split<'a>(&self, frame: &'a [u8]) -> Result<(&'a str, &'a [u8]), ProtocolError>;
}

/// The length-prefixed header layout (the current wire scheme).
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthPrefixed;

impl FrameLayout for LengthPrefixed {
    fn frame(&self, header: &str, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        if header.is_empty() {
            return Err(ProtocolError::MalformedFrame(
                "header must not be empty".into(),
            ));
        }
        let header_bytes = header.as_bytes();
        let declared = i32::try_from(header_bytes.len()).map_err(|_| {
            ProtocolError::MalformedFrame(format!(
                "header of {} bytes exceeds the signed 32-bit length field",
                header_bytes.len()
            ))
        })?;

        let mut frame =
            Vec::with_capacity(LEN_PREFIX_BYTES + header_bytes.len() + payload.len());
        frame.extend_from_slice(&declared.to_le_bytes());
        frame.extend_from_slice(header_bytes);
        frame.extend_from_slice(payload);
        Ok(frame)
    }

    fn split<'a>(&self, frame: &'a [u8]) -> Result<(&'a str, &'a [u8]), ProtocolError> {
        let (prefix, rest) = frame.split_at_checked(LEN_PREFIX_BYTES).ok_or_else(|| {
            ProtocolError::MalformedFrame(format!(
                "frame of {} bytes is shorter than the {LEN_PREFIX_BYTES}-byte length prefix",
                frame.len()
            ))
        })?;

        let mut len_bytes = [0u8; LEN_PREFIX_BYTES];
        len_bytes.copy_from_slice(prefix);
        let declared = i32::from_le_bytes(len_bytes);
        if declared <= 0 {
            return Err(ProtocolError::MalformedFrame(format!(
                "declared header length {declared} is not positive"
            )));
        }

        let header_len = declared as usize;
        let (header_bytes, payload) = rest.split_at_checked(header_len).ok_or_else(|| {
            ProtocolError::MalformedFrame(format!(
                "declared header length {header_len} exceeds the {} bytes remaining",
                rest.len()
            ))
        })?;

        let header = std::str::from_utf8(header_bytes).map_err(|_| {
            ProtocolError::MalformedFrame("header bytes are not valid UTF-8".into())
        })?;

        Ok((header, payload))
    }
}
