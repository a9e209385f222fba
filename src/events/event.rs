//! # Runtime events emitted by nets, subscribers and dispatchers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Firing events**: what happened to a transition or place during `fire`
//! - **Subscriber events**: delivery problems in the fan-out layer
//! - **Dispatcher events**: lifecycle of the async owner loop
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! transition/place names and token counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use petrinet::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TokensClamped)
//!     .with_place("waiting-for-item")
//!     .with_tokens(1);
//!
//! assert_eq!(ev.kind, EventKind::TokensClamped);
//! assert_eq!(ev.place.as_deref(), Some("waiting-for-item"));
//! assert_eq!(ev.tokens, Some(1));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Firing events ===
    /// A transition was fired by a caller.
    ///
    /// Sets:
    /// - `net`: net id
    /// - `transition`: transition name
    /// - `auto_fired`: number of auto-fires cascaded from this call
    ///
    /// Published after the cascade, so it follows the `AutoFired` events and a
    /// possible `CascadeLimitHit`.
    TransitionFired,

    /// A caller fired a transition that was not enabled; the event was dropped.
    ///
    /// Sets:
    /// - `net`: net id
    /// - `transition`: transition name
    TransitionSkipped,

    /// The engine fired an auto-fire transition during propagation.
    ///
    /// Sets:
    /// - `net`: net id
    /// - `transition`: transition name
    AutoFired,

    /// A place reached its capacity and surplus tokens were discarded.
    ///
    /// Sets:
    /// - `net`: net id
    /// - `transition`: producing transition
    /// - `place`: place name
    /// - `tokens`: number of discarded tokens
    TokensClamped,

    /// Propagation hit `Config::max_auto_fires`.
    ///
    /// Sets:
    /// - `net`: net id
    /// - `transition`: transition that would have exceeded the limit
    /// - `reason`: limit description
    CascadeLimitHit,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Dispatcher events ===
    /// Dispatcher loop took ownership of a net.
    ///
    /// Sets:
    /// - `net`: net id
    DispatcherStarted,

    /// Dispatcher loop exited and released the net.
    ///
    /// Sets:
    /// - `net`: net id
    /// - `reason`: "cancelled" or "closed"
    DispatcherStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Id of the emitting net, if applicable.
    pub net: Option<u64>,
    /// Name of the transition, if applicable.
    pub transition: Option<Arc<str>>,
    /// Name of the place, if applicable.
    pub place: Option<Arc<str>>,
    /// Token count (discarded tokens for `TokensClamped`).
    pub tokens: Option<u32>,
    /// Number of cascaded auto-fires.
    pub auto_fired: Option<u32>,
    /// Name of the subscriber, if applicable.
    pub subscriber: Option<Arc<str>>,
    /// Human-readable reason (overflow details, panic info, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            net: None,
            transition: None,
            place: None,
            tokens: None,
            auto_fired: None,
            subscriber: None,
            reason: None,
        }
    }

    /// Attaches the emitting net id.
    #[inline]
    pub fn with_net(mut self, net: u64) -> Self {
        self.net = Some(net);
        self
    }

    /// Attaches a transition name.
    #[inline]
    pub fn with_transition(mut self, transition: impl Into<Arc<str>>) -> Self {
        self.transition = Some(transition.into());
        self
    }

    /// Attaches a place name.
    #[inline]
    pub fn with_place(mut self, place: impl Into<Arc<str>>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Attaches a token count.
    #[inline]
    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Attaches the number of cascaded auto-fires (saturating at `u32::MAX`).
    #[inline]
    pub fn with_auto_fired(mut self, n: usize) -> Self {
        self.auto_fired = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(subscriber.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::AutoFired);
        let b = Event::new(EventKind::AutoFired);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_overflow_helper() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert!(!ev.is_subscriber_panic());
        assert_eq!(ev.subscriber.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }

    #[test]
    fn test_auto_fired_saturates() {
        let ev = Event::new(EventKind::TransitionFired).with_auto_fired(usize::MAX);
        assert_eq!(ev.auto_fired, Some(u32::MAX));
    }
}
