//! Wire protocol for Palaver.
//!
//! This crate defines how a typed message becomes bytes and comes back:
//!
//! - **Message capability** ([`Message`]) — the marker every wire-participating
//!   payload type implements.
//! - **Registry** ([`BiMap`]) — the strict one-to-one header↔type map.
//! - **Catalog** ([`MessageCatalog`], [`VariantSet`]) — variant registration
//!   and the whole-message encode/decode entry points.
//! - **Frame layouts** ([`FrameLayout`], [`LengthPrefixed`]) — how the header
//!   and payload share one byte buffer.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how a payload's fields become
//!   bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing any of that.
//!
//! # Architecture
//!
//! The protocol layer sits between a transport (raw bytes) and dispatch
//! (typed subscribers). It knows nothing about sockets or subscriptions —
//! only how to associate, frame, and (de)serialize messages:
//!
//! ```text
//! Transport (bytes) → Catalog (Box<dyn Message>) → Dispatch (typed handlers)
//! ```

mod bimap;
mod catalog;
mod codec;
mod error;
mod frame;
mod message;

pub use bimap::{BiMap, Occupied};
pub use catalog::{MessageCatalog, VariantSet};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use frame::{FrameLayout, LEN_PREFIX_BYTES, LengthPrefixed};
pub use message::Message;
