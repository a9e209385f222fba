//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [fired] net=1 transition="subscription_loaded" auto_fired=1
//! [auto-fired] net=1 transition="enable_switch"
//! [skipped] net=1 transition="payment_updated"
//! [clamped] net=1 place="waiting_for_item" discarded=1
//! [cascade-limit] net=1 transition="to_pong" limit=1024
//! [dispatcher-stopped] net=1 reason=cancelled
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn or_unknown(v: Option<&str>) -> &str {
    v.unwrap_or("unknown")
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let net = e.net.unwrap_or_default();
        match e.kind {
            EventKind::TransitionFired => {
                println!(
                    "[fired] net={net} transition={:?} auto_fired={}",
                    or_unknown(e.transition.as_deref()),
                    e.auto_fired.unwrap_or(0)
                );
            }
            EventKind::TransitionSkipped => {
                println!(
                    "[skipped] net={net} transition={:?}",
                    or_unknown(e.transition.as_deref())
                );
            }
            EventKind::AutoFired => {
                println!(
                    "[auto-fired] net={net} transition={:?}",
                    or_unknown(e.transition.as_deref())
                );
            }
            EventKind::TokensClamped => {
                println!(
                    "[clamped] net={net} place={:?} discarded={}",
                    or_unknown(e.place.as_deref()),
                    e.tokens.unwrap_or(0)
                );
            }
            EventKind::CascadeLimitHit => {
                println!(
                    "[cascade-limit] net={net} transition={:?} {}",
                    or_unknown(e.transition.as_deref()),
                    or_unknown(e.reason.as_deref())
                );
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={} reason={}",
                    or_unknown(e.subscriber.as_deref()),
                    or_unknown(e.reason.as_deref())
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    or_unknown(e.subscriber.as_deref()),
                    or_unknown(e.reason.as_deref())
                );
            }
            EventKind::DispatcherStarted => {
                println!("[dispatcher-started] net={net}");
            }
            EventKind::DispatcherStopped => {
                println!(
                    "[dispatcher-stopped] net={net} reason={}",
                    or_unknown(e.reason.as_deref())
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
