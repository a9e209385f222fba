//! # Graph wiring and validation.
//!
//! [`NetBuilder`] collects places and transitions for one net. Every arc is
//! validated when the transition is registered, so a built [`PetriNet`] is
//! always well-formed and `fire` never reports construction problems.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::config::Config;
use crate::core::net::{Node, PetriNet};
use crate::core::place::{Place, PlaceId};
use crate::core::transition::{Transition, TransitionHandle, TypedBody};
use crate::error::BuildError;
use crate::events::Bus;

/// Global counter for net identities.
static NET_SEQ: AtomicU64 = AtomicU64::new(1);

/// Builder for a [`PetriNet`].
///
/// ## Example
/// ```rust
/// use petrinet::{BuildError, Config, PetriNet, Place, Transition};
///
/// let mut b = PetriNet::builder(Config::default());
/// let done = b.place(Place::new("done")).unwrap();
///
/// let err = b
///     .transition(Transition::<()>::new("bad").output(done, 0))
///     .unwrap_err();
/// assert!(matches!(err, BuildError::ZeroWeight { .. }));
/// ```
pub struct NetBuilder {
    id: u64,
    cfg: Config,
    places: Vec<Place>,
    nodes: Vec<Node>,
    place_names: HashSet<String>,
    transition_names: HashSet<Arc<str>>,
    bus: Option<Bus>,
}

impl NetBuilder {
    /// Creates an empty builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            id: NET_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            cfg,
            places: Vec::new(),
            nodes: Vec::new(),
            place_names: HashSet::new(),
            transition_names: HashSet::new(),
            bus: None,
        }
    }

    /// Attaches an event bus; the built net publishes its firing events on it.
    pub fn with_bus(&mut self, bus: Bus) -> &mut Self {
        self.bus = Some(bus);
        self
    }

    /// Registers a place and returns its handle.
    pub fn place(&mut self, place: Place) -> Result<PlaceId, BuildError> {
        if self.place_names.contains(place.name()) {
            return Err(BuildError::DuplicatePlace {
                place: place.name().to_string(),
            });
        }
        if let Some(cap) = place.raw_capacity() {
            if cap == 0 {
                return Err(BuildError::ZeroCapacity {
                    place: place.name().to_string(),
                });
            }
            if place.tokens() > cap {
                return Err(BuildError::InitialTokensExceedCapacity {
                    place: place.name().to_string(),
                    tokens: place.tokens(),
                    capacity: cap,
                });
            }
        }

        self.place_names.insert(place.name().to_string());
        let id = PlaceId {
            net: self.id,
            index: self.places.len(),
        };
        self.places.push(place);
        Ok(id)
    }

    /// Registers a transition and returns its typed handle.
    ///
    /// Transitions are scanned in registration order during propagation.
    pub fn transition<T: Send + 'static>(
        &mut self,
        transition: Transition<T>,
    ) -> Result<TransitionHandle<T>, BuildError> {
        let name: Arc<str> = Arc::from(transition.name());
        if self.transition_names.contains(&name) {
            return Err(BuildError::DuplicateTransition {
                transition: name.to_string(),
            });
        }

        let inputs = self.resolve_arcs(&name, &transition.inputs)?;
        let outputs = self.resolve_arcs(&name, &transition.outputs)?;
        let auto_fire = transition.auto.is_some();
        if auto_fire && inputs.is_empty() {
            return Err(BuildError::UnguardedAutoFire {
                transition: name.to_string(),
            });
        }

        self.transition_names.insert(Arc::clone(&name));
        let index = self.nodes.len();
        self.nodes.push(Node {
            name,
            inputs,
            outputs,
            auto_fire,
            body: Box::new(TypedBody::new(transition.action, transition.auto)),
        });
        Ok(TransitionHandle::new(self.id, index))
    }

    /// Finalizes the net.
    pub fn build(self) -> PetriNet {
        PetriNet::from_parts(self.id, self.cfg, self.places, self.nodes, self.bus)
    }

    /// Checks one side of a transition and converts handles into indices.
    fn resolve_arcs(
        &self,
        transition: &str,
        arcs: &[(PlaceId, u32)],
    ) -> Result<Vec<(usize, u32)>, BuildError> {
        let mut seen = HashSet::with_capacity(arcs.len());
        let mut out = Vec::with_capacity(arcs.len());

        for &(place, count) in arcs {
            if place.net != self.id || place.index >= self.places.len() {
                return Err(BuildError::ForeignPlace {
                    transition: transition.to_string(),
                });
            }
            let place_name = self.places[place.index].name();
            if count == 0 {
                return Err(BuildError::ZeroWeight {
                    transition: transition.to_string(),
                    place: place_name.to_string(),
                });
            }
            if !seen.insert(place.index) {
                return Err(BuildError::DuplicateArc {
                    transition: transition.to_string(),
                    place: place_name.to_string(),
                });
            }
            out.push((place.index, count));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let mut b = NetBuilder::new(Config::default());
        let err = b.place(Place::new("p").with_capacity(0)).unwrap_err();
        assert_eq!(err.as_label(), "build_zero_capacity");
    }

    #[test]
    fn test_initial_tokens_above_capacity_rejected() {
        let mut b = NetBuilder::new(Config::default());
        let err = b
            .place(Place::new("p").with_capacity(1).with_tokens(2))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::InitialTokensExceedCapacity {
                place: "p".into(),
                tokens: 2,
                capacity: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut b = NetBuilder::new(Config::default());
        let p = b.place(Place::new("p")).unwrap();
        assert!(matches!(
            b.place(Place::new("p")),
            Err(BuildError::DuplicatePlace { .. })
        ));

        b.transition(Transition::<()>::new("t").output(p, 1)).unwrap();
        assert!(matches!(
            b.transition(Transition::<()>::new("t").output(p, 1)),
            Err(BuildError::DuplicateTransition { .. })
        ));
    }

    #[test]
    fn test_zero_weight_rejected_on_input() {
        let mut b = NetBuilder::new(Config::default());
        let p = b.place(Place::new("p")).unwrap();
        let err = b
            .transition(Transition::<()>::new("t").input(p, 0))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::ZeroWeight {
                transition: "t".into(),
                place: "p".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_arc_rejected() {
        let mut b = NetBuilder::new(Config::default());
        let p = b.place(Place::new("p")).unwrap();
        let err = b
            .transition(Transition::<()>::new("t").input(p, 1).input(p, 2))
            .unwrap_err();
        assert_eq!(err.as_label(), "build_duplicate_arc");
    }

    #[test]
    fn test_same_place_on_both_sides_allowed() {
        let mut b = NetBuilder::new(Config::default());
        let p = b.place(Place::new("p").with_tokens(1)).unwrap();
        assert!(
            b.transition(Transition::<()>::new("gate").input(p, 1).output(p, 1))
                .is_ok()
        );
    }

    #[test]
    fn test_foreign_place_rejected() {
        let mut other = NetBuilder::new(Config::default());
        let foreign = other.place(Place::new("p")).unwrap();

        let mut b = NetBuilder::new(Config::default());
        b.place(Place::new("p")).unwrap();
        let err = b
            .transition(Transition::<()>::new("t").output(foreign, 1))
            .unwrap_err();
        assert_eq!(err.as_label(), "build_foreign_place");
    }

    #[test]
    fn test_unguarded_auto_fire_rejected() {
        let mut b = NetBuilder::new(Config::default());
        let p = b.place(Place::new("p")).unwrap();
        let err = b
            .transition(Transition::<()>::new("t").output(p, 1).auto_fire())
            .unwrap_err();
        assert_eq!(err.as_label(), "build_unguarded_auto_fire");
    }

    #[test]
    fn test_failed_registration_leaves_builder_usable() {
        let mut b = NetBuilder::new(Config::default());
        let p = b.place(Place::new("p")).unwrap();
        assert!(b.transition(Transition::<()>::new("t").output(p, 0)).is_err());
        let h = b.transition(Transition::<()>::new("t").output(p, 1)).unwrap();
        assert_eq!(h.index(), 0);
        assert_eq!(b.build().transition_count(), 1);
    }
}
