//! The [`TalkingPoint`] boundary trait.
//!
//! A talking point is the shape a transport presents to the rest of the
//! system: it *is* a dispatch hub (inbound messages surface through it) and
//! it *can send* (outbound messages disappear into it). How bytes actually
//! leave the process — socket, pipe, queue — is entirely the implementor's
//! business; the core only fixes this capability's shape.

use palaver_dispatch::{MessageHub, Subscription};
use palaver_protocol::Message;

/// A dispatch hub that can also send messages somewhere.
///
/// Implementors supply [`hub`](Self::hub) and
/// [`send_message`](Self::send_message); the subscription conveniences
/// delegate to the hub. A message handed to `send_message` is expected to
/// be the same kind of value that flows through the catalog's
/// encode/decode — typically the implementor encodes it and pushes the
/// frame at its transport.
///
/// The trait stays object-safe for the non-generic operations, so a
/// transport can be held as `Box<dyn TalkingPoint>`; the generic
/// conveniences are available on concrete types.
pub trait TalkingPoint: Send + Sync {
    /// The hub through which inbound messages reach subscribers.
    fn hub(&self) -> &MessageHub;

    /// Hands a message to the underlying transport.
    ///
    /// Returns `false` if the transport could not accept it (closed
    /// connection, full queue — implementor-defined).
    fn send_message(&self, message: &dyn Message) -> bool;

    /// Registers `callback` for inbound messages of exactly type `T`.
    fn subscribe<T, F>(&self, callback: F) -> Subscription
    where
        T: Message,
        F: Fn(&T) + Send + Sync + 'static,
        Self: Sized,
    {
        self.hub().subscribe(callback)
    }

    /// Removes one registration; `false` if it was not present.
    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.hub().unsubscribe(subscription)
    }

    /// Returns `true` if any callback is registered for `T`.
    fn has_subscribers<T: Message>(&self) -> bool
    where
        Self: Sized,
    {
        self.hub().has_subscribers::<T>()
    }

    /// Publishes an inbound message to this point's subscribers.
    fn publish(&self, message: &dyn Message) {
        self.hub().publish(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Clone)]
    struct Note {
        text: String,
    }
    impl Message for Note {}

    /// A talking point whose "transport" is a vector of sent messages.
    struct RecordingPoint {
        hub: MessageHub,
        sent: Mutex<Vec<String>>,
        accept: bool,
    }

    impl RecordingPoint {
        fn new(accept: bool) -> Self {
            Self {
                hub: MessageHub::new(),
                sent: Mutex::new(Vec::new()),
                accept,
            }
        }
    }

    impl TalkingPoint for RecordingPoint {
        fn hub(&self) -> &MessageHub {
            &self.hub
        }

        fn send_message(&self, message: &dyn Message) -> bool {
            if !self.accept {
                return false;
            }
            if let Some(note) = message.downcast_ref::<Note>() {
                self.sent.lock().unwrap().push(note.text.clone());
            }
            true
        }
    }

    #[test]
    fn test_send_message_reports_transport_outcome() {
        let open = RecordingPoint::new(true);
        assert!(open.send_message(&Note { text: "out".into() }));
        assert_eq!(*open.sent.lock().unwrap(), vec!["out".to_string()]);

        let closed = RecordingPoint::new(false);
        assert!(!closed.send_message(&Note { text: "lost".into() }));
        assert!(closed.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_subscription_conveniences_delegate_to_hub() {
        let point = RecordingPoint::new(true);
        assert!(!point.has_subscribers::<Note>());

        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        let subscription = point.subscribe::<Note, _>(move |note| {
            sink.lock().unwrap().push(note.text.clone());
        });
        assert!(point.has_subscribers::<Note>());

        point.publish(&Note { text: "in".into() });
        assert_eq!(*seen.lock().unwrap(), vec!["in".to_string()]);

        assert!(point.unsubscribe(subscription));
        assert!(!point.has_subscribers::<Note>());
    }

    #[test]
    fn test_usable_as_trait_object() {
        let point: Box<dyn TalkingPoint> = Box::new(RecordingPoint::new(true));
        point.publish(&Note { text: "nobody listening".into() });
        assert!(point.send_message(&Note { text: "x".into() }));
    }
}
