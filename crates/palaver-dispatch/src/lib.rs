//! Typed publish/subscribe dispatch for Palaver messages.
//!
//! This crate routes decoded messages to interested handlers:
//!
//! - **Hub** ([`MessageHub`]) — subscribers register a closure against one
//!   concrete message type; publishing invokes every closure registered for
//!   the message's exact runtime type.
//! - **Subscriptions** ([`Subscription`]) — copyable handles naming one
//!   registration, used to remove it again.
//! - **Shared hub** ([`global`]) — a lazily-created process-wide instance
//!   for code that doesn't pass a hub around explicitly.
//!
//! The hub never touches bytes; framing and serialization live in
//! `palaver-protocol`. A transport decodes a frame through the catalog and
//! hands the resulting `Box<dyn Message>` to [`MessageHub::publish`].

mod global;
mod hub;

pub use global::global;
pub use hub::{MessageHub, Subscription};
