//! End-to-end tests for the whole messaging core: catalog, frame layout,
//! hub, and a loopback talking point standing in for a real transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use palaver::prelude::*;
use palaver::{LengthPrefixed, ProtocolError};
use serde::{Deserialize, Serialize};

// =========================================================================
// Wire variants used throughout
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PingMessage;
impl Message for PingMessage {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    from: String,
    body: String,
}
impl Message for ChatMessage {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct KickMessage {
    reason: String,
}
impl Message for KickMessage {}

fn catalog_with_defaults() -> MessageCatalog<JsonCodec> {
    let catalog = MessageCatalog::new();
    catalog
        .register_set(
            VariantSet::new()
                .with_header::<PingMessage>("ping")
                .with_header::<ChatMessage>("chat")
                .with_header::<KickMessage>("kick"),
        )
        .unwrap();
    catalog
}

// =========================================================================
// Encode/decode across the full stack
// =========================================================================

#[test]
fn test_every_registered_variant_round_trips() {
    let catalog = catalog_with_defaults();

    let chat = ChatMessage { from: "ada".into(), body: "hello there".into() };
    let frame = catalog.encode(&chat).unwrap();
    assert_eq!(*catalog.decode(&frame).unwrap().downcast::<ChatMessage>().unwrap(), chat);

    let kick = KickMessage { reason: "afk".into() };
    let frame = catalog.encode(&kick).unwrap();
    assert_eq!(*catalog.decode(&frame).unwrap().downcast::<KickMessage>().unwrap(), kick);

    let frame = catalog.encode(&PingMessage).unwrap();
    assert!(catalog.decode(&frame).unwrap().is::<PingMessage>());
}

#[test]
fn test_ping_frame_bytes_match_wire_spec() {
    let catalog = catalog_with_defaults();
    let frame = catalog.encode(&PingMessage).unwrap();

    // little-endian 4, "ping", then the payload text
    assert_eq!(&frame[..4], &4i32.to_le_bytes());
    assert_eq!(&frame[4..8], b"ping");

    let decoded = catalog.decode(&frame).unwrap();
    assert_eq!(*decoded.downcast::<PingMessage>().unwrap(), PingMessage);
}

#[test]
fn test_chat_payload_is_readable_json() {
    let catalog = catalog_with_defaults();
    let frame = catalog
        .encode(&ChatMessage { from: "ada".into(), body: "hi".into() })
        .unwrap();

    let payload: serde_json::Value = serde_json::from_slice(&frame[8..]).unwrap();
    assert_eq!(payload["from"], "ada");
    assert_eq!(payload["body"], "hi");
}

#[test]
fn test_decode_surfaces_the_right_error_kind() {
    let catalog = catalog_with_defaults();

    // unknown header: association missing, not a framing problem
    let stranger = LengthPrefixed.frame("stranger", b"{}").unwrap();
    assert!(matches!(
        catalog.decode(&stranger).unwrap_err(),
        ProtocolError::UnknownHeader(header) if header == "stranger"
    ));

    // zero declared header length
    let mut zero = Vec::new();
    zero.extend_from_slice(&0i32.to_le_bytes());
    zero.extend_from_slice(b"{}");
    assert!(matches!(
        catalog.decode(&zero).unwrap_err(),
        ProtocolError::MalformedFrame(_)
    ));

    // header length pointing past the end of the buffer
    let mut overrun = Vec::new();
    overrun.extend_from_slice(&64i32.to_le_bytes());
    overrun.extend_from_slice(b"ping");
    assert!(matches!(
        catalog.decode(&overrun).unwrap_err(),
        ProtocolError::MalformedFrame(_)
    ));

    // well-framed, registered, but the payload isn't the variant's shape
    let bad_payload = LengthPrefixed.frame("chat", b"[1,2,3]").unwrap();
    assert!(matches!(
        catalog.decode(&bad_payload).unwrap_err(),
        ProtocolError::Decode(_)
    ));
}

#[test]
fn test_out_of_band_header_decode() {
    let catalog = catalog_with_defaults();

    // as if the header came from a queue topic, payload-only on the wire
    let decoded = catalog
        .decode_with_header("chat", br#"{"from":"bot","body":"topic"}"#)
        .unwrap();
    assert_eq!(decoded.downcast_ref::<ChatMessage>().unwrap().from, "bot");
}

// =========================================================================
// Decode → publish pipeline
// =========================================================================

#[test]
fn test_decoded_message_reaches_typed_subscribers() {
    let catalog = catalog_with_defaults();
    let hub = MessageHub::new();

    let chats = Arc::new(Mutex::new(Vec::new()));
    let pings = Arc::new(AtomicUsize::new(0));

    let sink = Arc::clone(&chats);
    hub.subscribe::<ChatMessage, _>(move |chat| {
        sink.lock().unwrap().push(chat.clone());
    });
    let counter = Arc::clone(&pings);
    hub.subscribe::<PingMessage, _>(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // inbound path: bytes → catalog → hub
    let chat = ChatMessage { from: "ada".into(), body: "hello".into() };
    for frame in [catalog.encode(&chat).unwrap(), catalog.encode(&PingMessage).unwrap()] {
        let message = catalog.decode(&frame).unwrap();
        hub.publish(message.as_ref());
    }

    assert_eq!(*chats.lock().unwrap(), vec![chat]);
    assert_eq!(pings.load(Ordering::SeqCst), 1);
}

#[test]
fn test_publishing_unsubscribed_variant_is_silent() {
    let catalog = catalog_with_defaults();
    let hub = MessageHub::new();

    let message = catalog
        .decode(&catalog.encode(&KickMessage { reason: "quiet".into() }).unwrap())
        .unwrap();
    // nobody subscribed to KickMessage: must be a no-op, not an error
    hub.publish(message.as_ref());
}

// =========================================================================
// Loopback talking point
// =========================================================================

/// A talking point whose transport is an in-memory frame queue: frames
/// "sent" on it can be pumped back through the catalog into its own hub.
struct LoopbackPoint {
    hub: MessageHub,
    catalog: MessageCatalog<JsonCodec>,
    wire: Mutex<VecDeque<Vec<u8>>>,
}

impl LoopbackPoint {
    fn new(catalog: MessageCatalog<JsonCodec>) -> Self {
        Self {
            hub: MessageHub::new(),
            catalog,
            wire: Mutex::new(VecDeque::new()),
        }
    }

    /// Delivers every queued frame: decode, then publish.
    fn pump(&self) -> Result<usize, ProtocolError> {
        let mut delivered = 0;
        loop {
            let frame = match self.wire.lock().unwrap().pop_front() {
                Some(frame) => frame,
                None => return Ok(delivered),
            };
            let message = self.catalog.decode(&frame)?;
            self.hub.publish(message.as_ref());
            delivered += 1;
        }
    }
}

impl TalkingPoint for LoopbackPoint {
    fn hub(&self) -> &MessageHub {
        &self.hub
    }

    fn send_message(&self, message: &dyn Message) -> bool {
        match self.catalog.encode(message) {
            Ok(frame) => {
                self.wire.lock().unwrap().push_back(frame);
                true
            }
            Err(_) => false,
        }
    }
}

#[test]
fn test_loopback_talking_point_delivers_sent_messages() {
    let point = LoopbackPoint::new(catalog_with_defaults());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    point.subscribe::<ChatMessage, _>(move |chat| {
        sink.lock().unwrap().push(chat.body.clone());
    });

    let chat = ChatMessage { from: "ada".into(), body: "looped".into() };
    assert!(point.send_message(&chat));
    assert!(point.send_message(&PingMessage));
    assert_eq!(point.pump().unwrap(), 2);

    assert_eq!(*seen.lock().unwrap(), vec!["looped".to_string()]);
}

#[test]
fn test_loopback_send_of_unregistered_variant_reports_failure() {
    #[derive(Debug, Serialize, Deserialize)]
    struct Unregistered;
    impl Message for Unregistered {}

    let point = LoopbackPoint::new(catalog_with_defaults());
    assert!(!point.send_message(&Unregistered));
    assert_eq!(point.pump().unwrap(), 0);
}

// =========================================================================
// Subscription bookkeeping through the prelude surface
// =========================================================================

#[test]
fn test_has_subscribers_tracks_subscribe_unsubscribe() {
    let hub = MessageHub::new();
    assert!(!hub.has_subscribers::<PingMessage>());

    let subscription = hub.subscribe::<PingMessage, _>(|_| {});
    assert!(hub.has_subscribers::<PingMessage>());

    assert!(hub.unsubscribe(subscription));
    assert!(!hub.has_subscribers::<PingMessage>());
}

#[test]
fn test_double_subscribe_single_unsubscribe_leaves_one() {
    let hub = MessageHub::new();
    let count = Arc::new(AtomicUsize::new(0));

    let bump = {
        let count = Arc::clone(&count);
        move |_: &PingMessage| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    let first = hub.subscribe::<PingMessage, _>(bump.clone());
    hub.subscribe::<PingMessage, _>(bump);

    assert!(hub.unsubscribe(first));
    hub.publish(&PingMessage);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_layout_swap_changes_the_wire_format() {
    /// A layout that frames as `header:payload` with no length prefix.
    #[derive(Debug, Clone, Copy)]
    struct ColonDelimited;

    impl FrameLayout for ColonDelimited {
        fn frame(&self, header: &str, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
            if header.is_empty() || header.contains(':') {
                return Err(ProtocolError::MalformedFrame("unframable header".into()));
            }
            let mut frame = Vec::with_capacity(header.len() + 1 + payload.len());
            frame.extend_from_slice(header.as_bytes());
            frame.push(b':');
            frame.extend_from_slice(payload);
            Ok(frame)
        }

        fn split<'a>(&self, frame: &'a [u8]) -> Result<(&'a str, &'a [u8]), ProtocolError> {
            let colon = frame
                .iter()
                .position(|byte| *byte == b':')
                .ok_or_else(|| ProtocolError::MalformedFrame("missing delimiter".into()))?;
            let header = std::str::from_utf8(&frame[..colon])
                .map_err(|_| ProtocolError::MalformedFrame("header is not UTF-8".into()))?;
            if header.is_empty() {
                return Err(ProtocolError::MalformedFrame("empty header".into()));
            }
            Ok((header, &frame[colon + 1..]))
        }
    }

    let catalog = catalog_with_defaults();
    catalog.set_layout(ColonDelimited);

    let frame = catalog.encode(&PingMessage).unwrap();
    assert!(frame.starts_with(b"ping:"));
    assert!(catalog.decode(&frame).unwrap().is::<PingMessage>());
}
