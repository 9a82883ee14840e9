//! # Palaver
//!
//! A small typed messaging core: how a message becomes bytes, how a
//! receiver recovers the right concrete type from those bytes, and how
//! interested parties hear about it.
//!
//! Palaver deliberately stops at the transport boundary. It consumes
//! "these bytes arrived" and produces "send these bytes"; sockets, retries,
//! ordering, and delivery guarantees belong to whatever transport you wire
//! it to.
//!
//! ```text
//! inbound:  transport bytes → MessageCatalog::decode → MessageHub::publish → typed callbacks
//! outbound: typed message → MessageCatalog::encode → transport bytes
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use palaver::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Ping;
//! impl Message for Ping {}
//!
//! // associate variants with wire headers, once, at startup
//! let catalog = MessageCatalog::new();
//! catalog.register_set(VariantSet::new().with_header::<Ping>("ping")).unwrap();
//!
//! // outbound
//! let frame = catalog.encode(&Ping).unwrap();
//!
//! // inbound
//! let hub = MessageHub::new();
//! hub.subscribe::<Ping, _>(|_| println!("ping!"));
//! let message = catalog.decode(&frame).unwrap();
//! hub.publish(message.as_ref());
//! ```

mod talking_point;

pub use talking_point::TalkingPoint;

pub use palaver_dispatch::{MessageHub, Subscription, global};
pub use palaver_protocol::{
    BiMap, Codec, FrameLayout, LEN_PREFIX_BYTES, LengthPrefixed, Message, MessageCatalog,
    Occupied, ProtocolError, VariantSet,
};

#[cfg(feature = "json")]
pub use palaver_protocol::JsonCodec;

/// One-stop imports for applications.
pub mod prelude {
    pub use crate::{
        Codec, FrameLayout, Message, MessageCatalog, MessageHub, Subscription, TalkingPoint,
        VariantSet, global,
    };

    #[cfg(feature = "json")]
    pub use crate::JsonCodec;
}
