//! The [`Message`] capability marker.
//!
//! A message carries no behavior of its own — its only contract is "has a
//! concrete runtime type distinguishable from other message variants". The
//! catalog and the dispatch hub both key on that concrete type, so the trait
//! is little more than [`Any`] plus the bounds needed to move messages
//! between threads and log them.

use std::any::Any;
use std::fmt;

/// Marker capability for one logical unit of communication.
///
/// Implement this for every payload struct that participates in the wire
/// protocol:
///
/// ```rust
/// use palaver_protocol::Message;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Ping;
///
/// impl Message for Ping {}
/// ```
///
/// The `Any` supertrait is what lets the hub recover the concrete type from
/// a `&dyn Message` at publish time, and lets the catalog key variants by
/// [`TypeId`](std::any::TypeId).
pub trait Message: Any + Send + Sync + fmt::Debug {
    /// Fully-qualified name of the concrete variant.
    ///
    /// Used as the default wire header and in diagnostics. The default body
    /// is instantiated per implementor, so calling this through
    /// `&dyn Message` reports the underlying concrete type.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// [`TypeId`](std::any::TypeId) of the concrete variant.
    ///
    /// Note that `Any::type_id` called directly on a `&dyn Message` resolves
    /// against the trait object itself and reports `TypeId::of::<dyn
    /// Message>()`; this method always reports the implementor's id.
    fn message_type_id(&self) -> std::any::TypeId {
        std::any::TypeId::of::<Self>()
    }
}

impl dyn Message {
    /// Returns `true` if the boxed-up concrete type is `T`.
    pub fn is<T: Message>(&self) -> bool {
        self.message_type_id() == std::any::TypeId::of::<T>()
    }

    /// Borrows the message narrowed to its concrete type, if it is `T`.
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Takes ownership of the message narrowed to its concrete type.
    ///
    /// On a type mismatch the original box is handed back so the caller can
    /// try another variant or republish it.
    pub fn downcast<T: Message>(self: Box<Self>) -> Result<Box<T>, Box<dyn Message>> {
        if self.is::<T>() {
            let any: Box<dyn Any> = self;
            match any.downcast::<T>() {
                Ok(typed) => Ok(typed),
                // the is::<T>() check above already proved the type
                Err(_) => unreachable!("downcast after successful type check"),
            }
        } else {
            Err(self)
        }
    }
}
