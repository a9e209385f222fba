//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//! - **Explicit unsubscribe**: [`SubscriberSet::add`] returns a [`SubscriptionId`];
//!   passing it to [`SubscriberSet::remove`] closes that subscriber's queue. There
//!   is no liveness check on the subscriber itself.
//!
//! ## Panic handling
//! Worker tasks use `catch_unwind` to isolate panics: the panic is converted to
//! `SubscriberPanicked` and the worker continues with the next event.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Handle returned by [`SubscriberSet::add`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    id: SubscriptionId,
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
    worker: JoinHandle<()>,
}

/// Fan-out coordinator for multiple event subscribers.
///
/// Must be created inside a tokio runtime: every subscriber gets a worker task.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    next_id: u64,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut set = Self {
            channels: Vec::with_capacity(subs.len()),
            next_id: 0,
            bus,
        };
        for sub in subs {
            set.add(sub);
        }
        set
    }

    /// Adds a subscriber and spawns its worker.
    ///
    /// Minimum queue capacity is 1 (enforced).
    pub fn add(&mut self, sub: Arc<dyn Subscribe>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let cap = sub.queue_capacity().max(1);
        let name = sub.name();
        let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
        let bus_for_worker = self.bus.clone();

        let worker = tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let fut = sub.on_event(ev.as_ref());

                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    let info = {
                        let any = &*panic_err;
                        if let Some(msg) = any.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = any.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        }
                    };
                    bus_for_worker.publish(Event::subscriber_panicked(sub.name(), info));
                }
            }
        });

        self.channels.push(SubscriberChannel {
            id,
            name,
            sender: tx,
            worker,
        });
        id
    }

    /// Removes a subscriber.
    ///
    /// Its queue is closed; events already queued are still delivered before the
    /// worker exits. Returns `false` if the id is unknown (already removed).
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        match self.channels.iter().position(|c| c.id == id) {
            Some(pos) => {
                self.channels.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of active subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an event to all subscribers (clones the event).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full: drops event, publishes `SubscriberOverflow`
    /// - On queue closed: publishes `SubscriberOverflow` with reason "closed"
    ///
    /// `SubscriberOverflow` events are not re-published if they themselves overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus
                            .publish(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        let workers: Vec<JoinHandle<()>> = self
            .channels
            .into_iter()
            .map(|SubscriberChannel { sender, worker, .. }| {
                drop(sender);
                worker
            })
            .collect();

        for h in workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "explode"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let a = Arc::new(Collect::default());
        let b = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![a.clone(), b.clone()];
        let set = SubscriberSet::new(subs, Bus::new(8));

        set.emit(&Event::new(EventKind::AutoFired));
        set.shutdown().await;

        assert_eq!(*a.seen.lock().unwrap(), vec![EventKind::AutoFired]);
        assert_eq!(*b.seen.lock().unwrap(), vec![EventKind::AutoFired]);
    }

    #[tokio::test]
    async fn test_removed_subscriber_stops_receiving() {
        let a = Arc::new(Collect::default());
        let mut set = SubscriberSet::new(Vec::new(), Bus::new(8));
        let id = set.add(a.clone());
        assert_eq!(set.len(), 1);

        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());

        set.emit(&Event::new(EventKind::AutoFired));
        set.shutdown().await;
        assert!(a.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_subscriber_reported_on_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Explode)];
        let set = SubscriberSet::new(subs, bus.clone());

        set.emit(&Event::new(EventKind::TransitionFired));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.subscriber.as_deref(), Some("explode"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
