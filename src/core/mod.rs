//! Engine core: places, transitions and the firing algorithm.
//!
//! The public API from this module is [`PetriNet`] and its builder, plus the
//! value types used to describe a graph.
//!
//! Internal modules:
//! - [`place`]: token counters with capacity clamp and the [`Marking`] snapshot;
//! - [`transition`]: typed reaction rules and their handles;
//! - [`builder`]: graph wiring and construction-time validation;
//! - [`net`]: `fire` and auto-fire propagation.

mod builder;
mod net;
mod place;
mod transition;

pub use builder::NetBuilder;
pub use net::{Fired, PetriNet};
pub use place::{Marking, Place, PlaceId};
pub use transition::{Transition, TransitionHandle};
