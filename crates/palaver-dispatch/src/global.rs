//! The process-wide shared hub.
//!
//! A default hub for components that don't want to thread an explicit
//! [`MessageHub`] reference around. It is initialized lazily on first use
//! and lives for the rest of the process. Code that needs isolation —
//! tests above all — should construct its own hub instead; everything the
//! shared instance can do, a local one can too.

use std::sync::OnceLock;

use crate::MessageHub;

static GLOBAL_HUB: OnceLock<MessageHub> = OnceLock::new();

/// Returns the process-wide shared hub, creating it on first call.
pub fn global() -> &'static MessageHub {
    GLOBAL_HUB.get_or_init(MessageHub::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use palaver_protocol::Message;

    #[derive(Debug)]
    struct GlobalProbe;
    impl Message for GlobalProbe {}

    #[test]
    fn test_global_returns_the_same_hub() {
        let first: *const MessageHub = global();
        let second: *const MessageHub = global();
        assert_eq!(first, second);
    }

    #[test]
    fn test_global_hub_dispatches() {
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let subscription = global().subscribe::<GlobalProbe, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        global().publish(&GlobalProbe);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // leave the shared hub clean for other tests in this process
        assert!(global().unsubscribe(subscription));
    }
}
