//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   PetriNet::fire ── publish(Event) ──► Bus ──► Dispatcher listener
//!                                                     │
//!                                                     └──► SubscriberSet::emit(&Event)
//!                                                               │
//!                                                     ┌─────────┼─────────┐
//!                                                     ▼         ▼         ▼
//!                                                 LogWriter   Audit    Custom ...
//! ```
//!
//! Subscribers are registered with [`SubscriberSet::add`] (or
//! [`DispatchHandle::subscribe`](crate::DispatchHandle::subscribe)) and removed
//! with the returned [`SubscriptionId`].

mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
mod embedded;

pub use subscribe::Subscribe;
pub use subscriber_set::{SubscriberSet, SubscriptionId};

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
