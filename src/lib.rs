//! # petrinet
//!
//! **petrinet** is a small token-flow coordination engine.
//!
//! Asynchronous facts ("item loaded", "payment updated") are modelled as
//! transitions that move tokens between places. Follow-up work that must
//! wait for several facts is a transition with several inputs; marked
//! auto-fire, it runs as soon as the last fact arrives, exactly once per
//! complete set of tokens.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   async sources        DispatchHandle::fire / try_fire       (or SharedNet::fire
//!  (loaders, I/O) ─────────────────┬─────────────────────────    from threads)
//!                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (single tokio task owning the net)                    │
//! │  - request queue (bounded mpsc, arrival order)                    │
//! │  - PetriNet::fire                                                 │
//! │       ├─ debit inputs ─► run action(payload) ─► credit outputs    │
//! │       └─ propagate: auto-fire enabled transitions until quiet     │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ publishes: TransitionFired, AutoFired, TransitionSkipped,
//!        │            TokensClamped, CascadeLimitHit, ...
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                 (capacity: Config::bus_capacity)                  │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                            SubscriberSet
//!                           (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Fire
//! ```text
//! fire(t, payload)
//!   ├─ handle of another net      ─► Err(ForeignTransition)
//!   ├─ some input lacks tokens    ─► Ok(Skipped), marking untouched
//!   └─ otherwise
//!        ├─ debit every input
//!        ├─ action(payload)
//!        ├─ credit every output (clamped at capacity)
//!        └─ loop {
//!             scan auto-fire transitions in registration order,
//!             fire each enabled one (T::default()) at most once per pass;
//!             a place that gains tokens re-arms its other consumers;
//!             stop after a scan that fires nothing
//!           }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Graph**         | Places, typed transitions, build-time validation.        | [`NetBuilder`], [`Place`], [`Transition`]   |
//! | **Engine**        | Fire, auto-fire propagation, marking snapshots.          | [`PetriNet`], [`Fired`], [`Marking`]        |
//! | **Concurrency**   | Async single-owner loop or a thread-shared lock.         | [`Dispatcher`], [`SharedNet`]               |
//! | **Subscriber API**| Observe fires, clamps and cascade limits.                | [`Subscribe`], [`SubscriberSet`]            |
//! | **Errors**        | Typed errors for building, firing and dispatching.       | [`BuildError`], [`FireError`], [`DispatchError`] |
//! | **Configuration** | Cascade limit and queue sizes.                           | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use petrinet::{Config, Fired, PetriNet, Place, Transition};
//!
//! let mut b = PetriNet::builder(Config::default());
//! let item = b.place(Place::new("waiting_for_item").with_capacity(1))?;
//! let sub = b.place(Place::new("waiting_for_subscription").with_capacity(1))?;
//!
//! let item_loaded = b.transition(Transition::<u64>::new("item_loaded").output(item, 1))?;
//! let sub_loaded = b.transition(Transition::<bool>::new("subscription_loaded").output(sub, 1))?;
//! b.transition(
//!     Transition::<()>::new("enable_switch")
//!         .input(item, 1)
//!         .input(sub, 1)
//!         .action(|()| println!("switch enabled"))
//!         .auto_fire(),
//! )?;
//!
//! let mut net = b.build();
//! assert_eq!(net.fire(&item_loaded, 42)?, Fired::Fired { auto_fired: 0 });
//! assert_eq!(net.fire(&sub_loaded, true)?, Fired::Fired { auto_fired: 1 });
//! assert_eq!(net.marking().total(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod config;
mod core;
mod dispatch;
mod error;
mod events;
mod shared;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use self::core::{Fired, Marking, NetBuilder, PetriNet, Place, PlaceId, Transition, TransitionHandle};
pub use dispatch::{DispatchHandle, Dispatcher};
pub use error::{BuildError, DispatchError, FireError};
pub use events::{Bus, Event, EventKind};
pub use shared::SharedNet;
pub use subscribers::{Subscribe, SubscriberSet, SubscriptionId};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
