//! Echo demo: the messaging core wired to an in-process channel transport.
//!
//! Outbound messages are encoded by the catalog and pushed down a tokio
//! channel; a reader task decodes whatever arrives and publishes it back
//! through the talking point's own hub. The core never learns that the
//! "network" is a channel — that is the whole point of the boundary.
//!
//! Run with `RUST_LOG=debug` to watch registration and frame traffic.

use std::sync::Arc;
use std::time::Duration;

use palaver::prelude::*;
use palaver::ProtocolError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Wire variants
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct Ping;
impl Message for Ping {}

#[derive(Debug, Serialize, Deserialize)]
struct Chat {
    from: String,
    body: String,
}
impl Message for Chat {}

// ---------------------------------------------------------------------------
// Channel-backed talking point
// ---------------------------------------------------------------------------

/// A talking point whose transport is one half of a tokio channel.
struct ChannelPoint {
    hub: MessageHub,
    catalog: MessageCatalog<JsonCodec>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl TalkingPoint for ChannelPoint {
    fn hub(&self) -> &MessageHub {
        &self.hub
    }

    fn send_message(&self, message: &dyn Message) -> bool {
        match self.catalog.encode(message) {
            Ok(frame) => self.outbound.send(frame).is_ok(),
            Err(error) => {
                warn!(%error, "failed to encode outbound message");
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ProtocolError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let catalog = MessageCatalog::new();
    catalog.register_set(
        VariantSet::new()
            .with_header::<Ping>("ping")
            .with_header::<Chat>("chat"),
    )?;

    let (outbound, mut inbound) = mpsc::unbounded_channel::<Vec<u8>>();
    let point = Arc::new(ChannelPoint {
        hub: MessageHub::new(),
        catalog,
        outbound,
    });

    point.subscribe::<Ping, _>(|_| info!("ping came back around"));
    point.subscribe::<Chat, _>(|chat| {
        info!(from = %chat.from, body = %chat.body, "chat came back around");
    });

    // the "receive side of the wire": decode and publish whatever arrives
    let receiver = Arc::clone(&point);
    let reader = tokio::spawn(async move {
        while let Some(frame) = inbound.recv().await {
            match receiver.catalog.decode(&frame) {
                Ok(message) => receiver.publish(message.as_ref()),
                Err(error) => warn!(%error, "dropping undecodable frame"),
            }
        }
    });

    point.send_message(&Ping);
    point.send_message(&Chat {
        from: "demo".into(),
        body: "hello from the other side of the channel".into(),
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    reader.abort();
    Ok(())
}
