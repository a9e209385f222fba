//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by nets, subscriber workers and the
//! dispatcher.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PetriNet::fire` (fired/skipped/auto-fired/clamped/cascade limit),
//!   `SubscriberSet` workers (overflow/panic), `Dispatcher` (started/stopped).
//! - **Consumers**: the dispatcher listener (fans out to `SubscriberSet`) or any
//!   receiver obtained with [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
