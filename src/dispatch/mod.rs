//! # Async dispatcher
//!
//! Owns a [`PetriNet`](crate::PetriNet) on a single tokio task and executes
//! fire requests submitted through cloneable [`DispatchHandle`]s, one at a
//! time in arrival order.
//!
//! ```text
//! DispatchHandle ──┐                 ┌──────────── Dispatcher task ────────────┐
//! DispatchHandle ──┼─► mpsc queue ──►│ net.fire(..) ──► Bus ──► SubscriberSet  │
//! DispatchHandle ──┘  (bounded)      └─────────────────────────────────────────┘
//! ```
//!
//! - `fire().await` waits for queue space and returns the outcome.
//! - `try_fire()` fails fast with [`DispatchError::Full`](crate::DispatchError::Full).
//! - Cancelling the token (or [`Dispatcher::shutdown`]) stops the loop;
//!   queued requests are dropped and their callers see `Closed`.

mod core;

pub use self::core::{DispatchHandle, Dispatcher};
