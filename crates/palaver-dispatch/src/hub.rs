//! The typed publish/subscribe hub.
//!
//! Subscriptions are keyed by the *exact* concrete message type — two
//! distinct variants never cross-trigger each other's handlers, even if the
//! application gives them a shared shape. That exactness is what lets
//! [`MessageHub::subscribe`] stay statically typed at the call site while
//! the hub internally stores type-erased slots: the narrowing from
//! `&dyn Message` back to `&T` is decided once, when the slot is created.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use palaver_protocol::Message;

/// Handle naming one registration of one callback.
///
/// Returned by [`MessageHub::subscribe`] and consumed by
/// [`MessageHub::unsubscribe`]. Subscribing the same closure twice yields
/// two distinct handles, and each removes exactly one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    type_id: TypeId,
    id: u64,
}

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Type-erased view of one variant's callback list.
///
/// The only operations that need the concrete type — pushing a new callback
/// and narrowing a published message — are reached through `as_any_mut`
/// downcasting and the snapshot closure respectively.
trait Slot: Send + Sync {
    /// Clones the current callback list into a closure that can run after
    /// the hub's lock is released.
    fn snapshot(&self) -> Box<dyn FnOnce(&dyn Message) + Send>;
    fn remove(&mut self, id: u64) -> bool;
    fn len(&self) -> usize;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedSlot<T: Message> {
    callbacks: Vec<(u64, Callback<T>)>,
}

impl<T: Message> TypedSlot<T> {
    fn new() -> Self {
        Self { callbacks: Vec::new() }
    }

    fn push(&mut self, id: u64, callback: Callback<T>) {
        self.callbacks.push((id, callback));
    }
}

impl<T: Message> Slot for TypedSlot<T> {
    fn snapshot(&self) -> Box<dyn FnOnce(&dyn Message) + Send> {
        let callbacks: Vec<Callback<T>> = self
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        Box::new(move |message: &dyn Message| {
            // slots are keyed by exact TypeId, so this narrowing only fails
            // if the hub map itself is inconsistent
            let Some(typed) = message.downcast_ref::<T>() else {
                return;
            };
            for callback in &callbacks {
                callback(typed);
            }
        })
    }

    fn remove(&mut self, id: u64) -> bool {
        match self.callbacks.iter().position(|(slot_id, _)| *slot_id == id) {
            Some(index) => {
                self.callbacks.remove(index);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.callbacks.len()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Routes published messages to subscribers of their exact concrete type.
///
/// Publishing a type with no subscribers and unsubscribing an absent
/// registration are both silent no-ops. All operations are synchronous and
/// bounded; `publish` snapshots the slot's callback list and releases every
/// lock before invoking, so a callback may freely subscribe, unsubscribe,
/// or publish on the same hub.
///
/// The hub is independently instantiable; a process-wide shared instance is
/// available through [`global`](crate::global).
pub struct MessageHub {
    slots: RwLock<HashMap<TypeId, Box<dyn Slot>>>,
    next_id: AtomicU64,
}

impl MessageHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers `callback` for messages of exactly type `T`.
    ///
    /// The slot for `T` is created lazily on first subscription. Adding the
    /// same callback twice registers it twice — it will run once per
    /// registration on every publish until unsubscribed as many times.
    pub fn subscribe<T, F>(&self, callback: F) -> Subscription
    where
        T: Message,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut slots = self.slots.write();
        let slot = slots
            .entry(type_id)
            .or_insert_with(|| Box::new(TypedSlot::<T>::new()));
        if let Some(typed) = slot.as_any_mut().downcast_mut::<TypedSlot<T>>() {
            typed.push(id, Arc::new(callback));
        }

        trace!(variant = std::any::type_name::<T>(), id, "subscribed");
        Subscription { type_id, id }
    }

    /// Removes the one registration named by `subscription`.
    ///
    /// Returns `false` — not an error — if it was never made or was already
    /// removed. The slot itself stays behind even when it empties out; an
    /// empty slot has no observable effect beyond a no-op lookup hit.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut slots = self.slots.write();
        let removed = match slots.get_mut(&subscription.type_id) {
            Some(slot) => slot.remove(subscription.id),
            None => false,
        };
        if removed {
            trace!(id = subscription.id, "unsubscribed");
        }
        removed
    }

    /// Returns `true` if at least one callback is registered for `T`.
    pub fn has_subscribers<T: Message>(&self) -> bool {
        self.subscriber_count::<T>() > 0
    }

    /// Number of live registrations for `T`.
    pub fn subscriber_count<T: Message>(&self) -> usize {
        self.slots
            .read()
            .get(&TypeId::of::<T>())
            .map(|slot| slot.len())
            .unwrap_or(0)
    }

    /// Invokes every callback registered for the message's exact runtime
    /// type, in registration order.
    ///
    /// No supertype lookup happens: a subscriber to `A` never sees a `B`.
    /// Publishing a type nobody subscribed to is a silent no-op. Callbacks
    /// registered or removed by a concurrent (or reentrant) call may or may
    /// not see this message; the callback list is snapshotted once, before
    /// the first invocation.
    pub fn publish(&self, message: &dyn Message) {
        let snapshot = {
            let slots = self.slots.read();
            match slots.get(&message.message_type_id()) {
                Some(slot) => slot.snapshot(),
                None => {
                    trace!(variant = message.type_name(), "published with no subscribers");
                    return;
                }
            }
        };
        snapshot(message);
    }
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHub")
            .field("slots", &self.slots.read().len())
            .finish()
    }
}
