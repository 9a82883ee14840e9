//! The message catalog: variant↔header association and whole-message
//! encode/decode.
//!
//! [`MessageCatalog`] is the single point of truth for which concrete
//! message types participate in the wire protocol and under which header
//! each one travels. It owns a [`BiMap`] of header↔`TypeId` associations,
//! a per-variant table of monomorphized serialize/deserialize functions,
//! and the currently active [`FrameLayout`].
//!
//! Serialization for a variant is captured once, at registration time, as a
//! pair of plain `fn` pointers instantiated for that concrete type. That is
//! what lets `encode(&dyn Message)` and `decode(&[u8]) -> Box<dyn Message>`
//! work without any runtime reflection: the type-correct narrowing happened
//! when the variant was registered.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, trace};

use crate::bimap::BiMap;
use crate::codec::Codec;
use crate::error::ProtocolError;
use crate::frame::{FrameLayout, LengthPrefixed};
use crate::message::Message;

#[cfg(feature = "json")]
use crate::codec::JsonCodec;

type EncodeFn<C> = fn(&dyn Message, &C) -> Result<Vec<u8>, ProtocolError>;
type DecodeFn<C> = fn(&[u8], &C) -> Result<Box<dyn Message>, ProtocolError>;

/// One registered variant: its header plus the serialize/deserialize
/// functions instantiated for its concrete type.
struct Variant<C> {
    header: String,
    type_name: &'static str,
    encode: EncodeFn<C>,
    decode: DecodeFn<C>,
}

fn encode_as<T, C>(message: &dyn Message, codec: &C) -> Result<Vec<u8>, ProtocolError>
where
    T: Message + Serialize,
    C: Codec,
{
    let typed = message
        .downcast_ref::<T>()
        .ok_or(ProtocolError::VariantMismatch(std::any::type_name::<T>()))?;
    codec.encode(typed)
}

fn decode_as<T, C>(payload: &[u8], codec: &C) -> Result<Box<dyn Message>, ProtocolError>
where
    T: Message + DeserializeOwned,
    C: Codec,
{
    let typed: T = codec.decode(payload)?;
    Ok(Box::new(typed))
}

// ---------------------------------------------------------------------------
// VariantSet — statically assembled bulk registration
// ---------------------------------------------------------------------------

/// A statically assembled table of `(header, variant)` pairs for bulk
/// registration.
///
/// This is the registration-table answer to "enumerate every variant a
/// module declares": each project lists its wire-participating types once,
/// at startup, and hands the set to
/// [`MessageCatalog::register_set`]. Variants already associated (either
/// side) are skipped silently there, so several sets with overlapping
/// entries can be applied in sequence.
///
/// ```rust
/// # use palaver_protocol::{Message, MessageCatalog, VariantSet};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Debug, Serialize, Deserialize)]
/// # struct Ping;
/// # impl Message for Ping {}
/// # #[derive(Debug, Serialize, Deserialize)]
/// # struct Chat { body: String }
/// # impl Message for Chat {}
/// let catalog = MessageCatalog::new();
/// let added = catalog
///     .register_set(VariantSet::new().with_header::<Ping>("ping").with::<Chat>())
///     .unwrap();
/// assert_eq!(added, 2);
/// ```
pub struct VariantSet<C> {
    entries: Vec<(TypeId, Variant<C>)>,
}

impl<C: Codec> VariantSet<C> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds a variant under its fully-qualified type name.
    pub fn with<T>(self) -> Self
    where
        T: Message + Serialize + DeserializeOwned,
    {
        self.with_header::<T>(std::any::type_name::<T>())
    }

    /// Adds a variant under an explicit header.
    pub fn with_header<T>(mut self, header: impl Into<String>) -> Self
    where
        T: Message + Serialize + DeserializeOwned,
    {
        self.entries.push((
            TypeId::of::<T>(),
            Variant {
                header: header.into(),
                type_name: std::any::type_name::<T>(),
                encode: encode_as::<T, C>,
                decode: decode_as::<T, C>,
            },
        ));
        self
    }

    /// Number of entries in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Codec> Default for VariantSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// MessageCatalog
// ---------------------------------------------------------------------------

/// Header and variant-table state, guarded by one lock so an association is
/// only ever observed whole.
struct Associations<C> {
    headers: BiMap<String, TypeId>,
    variants: HashMap<TypeId, Variant<C>>,
}

/// Associates message variants with wire headers and frames whole messages.
///
/// The catalog is `Send + Sync`; share it behind an `Arc` between the
/// inbound-decode thread and whoever encodes outbound messages. The payload
/// codec `C` is fixed at construction; the [`FrameLayout`] can be swapped at
/// runtime with [`set_layout`](Self::set_layout).
pub struct MessageCatalog<C: Codec> {
    inner: RwLock<Associations<C>>,
    layout: RwLock<Arc<dyn FrameLayout>>,
    codec: C,
}

#[cfg(feature = "json")]
impl MessageCatalog<JsonCodec> {
    /// Creates a catalog with the reference JSON payload codec and the
    /// length-prefixed header layout.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

#[cfg(feature = "json")]
impl Default for MessageCatalog<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> MessageCatalog<C> {
    /// Creates a catalog with the given payload codec and the
    /// length-prefixed header layout.
    pub fn with_codec(codec: C) -> Self {
        Self {
            inner: RwLock::new(Associations {
                headers: BiMap::new(),
                variants: HashMap::new(),
            }),
            layout: RwLock::new(Arc::new(LengthPrefixed)),
            codec,
        }
    }

    // -- registration -------------------------------------------------------

    /// Registers a variant under its fully-qualified type name.
    ///
    /// See [`register_with_header`](Self::register_with_header).
    pub fn register<T>(&self) -> Result<bool, ProtocolError>
    where
        T: Message + Serialize + DeserializeOwned,
    {
        self.register_with_header::<T>(std::any::type_name::<T>())
    }

    /// Registers a variant under an explicit header.
    ///
    /// Returns `Ok(true)` when the association was newly made and
    /// `Ok(false)` when either the header or the type already participates
    /// in one — bulk call sites may ignore the `false`, strict callers must
    /// check it. The existing association is never overwritten.
    ///
    /// # Errors
    /// Returns [`ProtocolError::EmptyHeader`] if `header` is empty.
    pub fn register_with_header<T>(&self, header: impl Into<String>) -> Result<bool, ProtocolError>
    where
        T: Message + Serialize + DeserializeOwned,
    {
        let header = header.into();
        if header.is_empty() {
            return Err(ProtocolError::EmptyHeader(std::any::type_name::<T>()));
        }

        let mut inner = self.inner.write();
        match inner.headers.try_insert(header.clone(), TypeId::of::<T>()) {
            Ok(()) => {
                inner.variants.insert(
                    TypeId::of::<T>(),
                    Variant {
                        header: header.clone(),
                        type_name: std::any::type_name::<T>(),
                        encode: encode_as::<T, C>,
                        decode: decode_as::<T, C>,
                    },
                );
                debug!(header = %header, variant = std::any::type_name::<T>(), "registered message variant");
                Ok(true)
            }
            Err(occupied) => {
                debug!(
                    header = %header,
                    variant = std::any::type_name::<T>(),
                    side = ?occupied,
                    "variant registration collided"
                );
                Ok(false)
            }
        }
    }

    /// Registers every entry of a [`VariantSet`], skipping entries whose
    /// header or type is already associated. Returns the number of variants
    /// newly added.
    ///
    /// # Errors
    /// Returns [`ProtocolError::EmptyHeader`] if any entry carries an empty
    /// header; no entry is registered in that case.
    pub fn register_set(&self, set: VariantSet<C>) -> Result<usize, ProtocolError> {
        if let Some((_, variant)) = set.entries.iter().find(|(_, v)| v.header.is_empty()) {
            return Err(ProtocolError::EmptyHeader(variant.type_name));
        }

        let mut added = 0;
        let mut inner = self.inner.write();
        for (type_id, variant) in set.entries {
            match inner.headers.try_insert(variant.header.clone(), type_id) {
                Ok(()) => {
                    debug!(header = %variant.header, variant = variant.type_name, "registered message variant");
                    inner.variants.insert(type_id, variant);
                    added += 1;
                }
                Err(occupied) => {
                    debug!(
                        header = %variant.header,
                        variant = variant.type_name,
                        side = ?occupied,
                        "skipping already-associated variant"
                    );
                }
            }
        }
        Ok(added)
    }

    // -- lookup -------------------------------------------------------------

    /// Header associated with the variant `T`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownVariant`] if `T` was never
    /// registered.
    pub fn header_for<T: Message>(&self) -> Result<String, ProtocolError> {
        self.inner
            .read()
            .variants
            .get(&TypeId::of::<T>())
            .map(|variant| variant.header.clone())
            .ok_or(ProtocolError::UnknownVariant(std::any::type_name::<T>()))
    }

    /// Header associated with a message's concrete runtime type.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownVariant`] if the type was never
    /// registered.
    pub fn header_of(&self, message: &dyn Message) -> Result<String, ProtocolError> {
        self.inner
            .read()
            .variants
            .get(&message.message_type_id())
            .map(|variant| variant.header.clone())
            .ok_or(ProtocolError::UnknownVariant(message.type_name()))
    }

    /// Returns `true` if the variant `T` is registered.
    pub fn is_registered<T: Message>(&self) -> bool {
        self.inner.read().variants.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if a variant is registered under `header`.
    pub fn contains_header(&self, header: &str) -> bool {
        self.inner.read().headers.contains_left(header)
    }

    /// Number of registered variants.
    pub fn variant_count(&self) -> usize {
        self.inner.read().headers.len()
    }

    // -- layout -------------------------------------------------------------

    /// Replaces the active frame layout.
    ///
    /// There is no transactional guarantee across in-flight encode/decode
    /// calls: a call racing the swap may be served by either the old or the
    /// new layout, but never by a torn mixture of the two.
    pub fn set_layout<L: FrameLayout>(&self, layout: L) {
        *self.layout.write() = Arc::new(layout);
        debug!("frame layout replaced");
    }

    fn active_layout(&self) -> Arc<dyn FrameLayout> {
        Arc::clone(&self.layout.read())
    }

    // -- encode / decode ----------------------------------------------------

    /// Serializes a message into a complete wire frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownVariant`] if the message's concrete
    /// type was never registered, or the codec/layout error otherwise.
    pub fn encode(&self, message: &dyn Message) -> Result<Vec<u8>, ProtocolError> {
        let (header, payload) = {
            let inner = self.inner.read();
            let variant = inner
                .variants
                .get(&message.message_type_id())
                .ok_or(ProtocolError::UnknownVariant(message.type_name()))?;
            let payload = (variant.encode)(message, &self.codec)?;
            (variant.header.clone(), payload)
        };

        let frame = self.active_layout().frame(&header, &payload)?;
        trace!(header = %header, frame_len = frame.len(), "encoded message");
        Ok(frame)
    }

    /// Deserializes a complete wire frame into a message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedFrame`] if the frame violates the
    /// active layout, [`ProtocolError::UnknownHeader`] if its header has no
    /// associated variant, or the codec's decode error if the payload does
    /// not deserialize. No partial message is ever returned.
    pub fn decode(&self, frame: &[u8]) -> Result<Box<dyn Message>, ProtocolError> {
        let layout = self.active_layout();
        let (header, payload) = layout.split(frame)?;
        self.decode_with_header(header, payload)
    }

    /// Deserializes a payload whose header was learned out-of-band (for
    /// example from a message-queue topic name), skipping frame splitting.
    ///
    /// # Errors
    /// Same as [`decode`](Self::decode), minus the framing failures.
    pub fn decode_with_header(
        &self,
        header: &str,
        payload: &[u8],
    ) -> Result<Box<dyn Message>, ProtocolError> {
        let inner = self.inner.read();
        let type_id = inner
            .headers
            .get_by_left(header)
            .copied()
            .ok_or_else(|| ProtocolError::UnknownHeader(header.to_owned()))?;
        let variant = inner
            .variants
            .get(&type_id)
            .ok_or_else(|| ProtocolError::UnknownHeader(header.to_owned()))?;

        let message = (variant.decode)(payload, &self.codec)?;
        trace!(header = %header, variant = variant.type_name, "decoded message");
        Ok(message)
    }
}
