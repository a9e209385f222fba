//! # The firing engine.
//!
//! [`PetriNet`] owns every place and transition of one coordination graph and
//! exposes a single entry point, [`PetriNet::fire`].
//!
//! ## Firing
//! ```text
//! fire(handle, payload)
//!   ├─ foreign handle?           → Err(ForeignTransition)
//!   ├─ inputs not satisfied?     → Ok(Skipped)          (event dropped, nothing changes)
//!   ├─ debit inputs
//!   ├─ action(payload)
//!   ├─ credit outputs (clamped at capacity)
//!   └─ propagate:
//!        loop {
//!          scan transitions in registration order:
//!            auto_fire && enabled && !fired_this_pass
//!              └─► debit → action(T::default()) → credit
//!                  mark fired; re-arm other consumers of the places it fed
//!          no transition fired during the scan → stop
//!        }
//! ```
//!
//! ## Rules
//! - `fire` takes `&mut self`: one graph is driven by one logical thread.
//! - Disabled transitions are not errors; callers may fire speculatively.
//! - The directly fired action runs before any cascaded action.
//! - Each auto-fire counts against [`Config::cascade_limit`]; exceeding it
//!   returns [`FireError::CascadeLimit`] and leaves the tokens of the steps
//!   already taken in place.

use std::sync::Arc;

use crate::config::Config;
use crate::core::builder::NetBuilder;
use crate::core::place::{Marking, Place, PlaceId};
use crate::core::transition::{Body, TransitionHandle, TypedBody};
use crate::error::FireError;
use crate::events::{Bus, Event, EventKind};

/// A registered transition with its arcs resolved to place indices.
pub(crate) struct Node {
    pub(crate) name: Arc<str>,
    pub(crate) inputs: Vec<(usize, u32)>,
    pub(crate) outputs: Vec<(usize, u32)>,
    pub(crate) auto_fire: bool,
    pub(crate) body: Box<dyn Body>,
}

/// Outcome of a successful `fire` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// The transition was not enabled; nothing changed.
    Skipped,
    /// The transition fired, followed by `auto_fired` cascaded auto-fires.
    Fired {
        /// Number of auto-fire steps run by propagation.
        auto_fired: usize,
    },
}

impl Fired {
    /// Returns `true` if the action ran.
    #[inline]
    pub fn is_fired(&self) -> bool {
        matches!(self, Fired::Fired { .. })
    }

    /// Number of cascaded auto-fires (0 when skipped).
    #[inline]
    pub fn auto_fired(&self) -> usize {
        match self {
            Fired::Skipped => 0,
            Fired::Fired { auto_fired } => *auto_fired,
        }
    }
}

/// Token-flow coordination engine for one graph.
///
/// ## Example: join two async sources
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use petrinet::{Config, PetriNet, Place, Transition};
///
/// let mut b = PetriNet::builder(Config::default());
/// let item = b.place(Place::new("item").with_capacity(1)).unwrap();
/// let sub = b.place(Place::new("subscription").with_capacity(1)).unwrap();
///
/// let item_loaded = b.transition(Transition::<String>::new("item_loaded").output(item, 1)).unwrap();
/// let sub_loaded = b.transition(Transition::<bool>::new("sub_loaded").output(sub, 1)).unwrap();
///
/// let enabled = Arc::new(Mutex::new(0));
/// let counter = Arc::clone(&enabled);
/// b.transition(
///     Transition::<()>::new("enable_switch")
///         .input(item, 1)
///         .input(sub, 1)
///         .auto_fire()
///         .action(move |()| *counter.lock().unwrap() += 1),
/// )
/// .unwrap();
///
/// let mut net = b.build();
/// net.fire(&item_loaded, "calendar".into()).unwrap();
/// assert_eq!(*enabled.lock().unwrap(), 0);
///
/// let outcome = net.fire(&sub_loaded, true).unwrap();
/// assert_eq!(outcome.auto_fired(), 1);
/// assert_eq!(*enabled.lock().unwrap(), 1);
/// ```
pub struct PetriNet {
    id: u64,
    cfg: Config,
    places: Vec<Place>,
    nodes: Vec<Node>,
    /// For each place, the transitions that consume from it.
    consumers: Vec<Vec<usize>>,
    bus: Option<Bus>,
}

impl PetriNet {
    /// Starts building a net.
    pub fn builder(cfg: Config) -> NetBuilder {
        NetBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        id: u64,
        cfg: Config,
        places: Vec<Place>,
        nodes: Vec<Node>,
        bus: Option<Bus>,
    ) -> Self {
        let mut consumers = vec![Vec::new(); places.len()];
        for (idx, node) in nodes.iter().enumerate() {
            for &(place, _) in &node.inputs {
                consumers[place].push(idx);
            }
        }
        Self {
            id,
            cfg,
            places,
            nodes,
            consumers,
            bus,
        }
    }

    /// Fires `transition` with `payload`, then propagates through auto-fire transitions.
    ///
    /// Returns [`Fired::Skipped`] if the transition is not enabled; the payload is dropped.
    /// `TransitionFired` is published once the cascade ends, also when it ends in
    /// [`FireError::CascadeLimit`].
    pub fn fire<T: Send + 'static>(
        &mut self,
        transition: &TransitionHandle<T>,
        payload: T,
    ) -> Result<Fired, FireError> {
        let idx = self.resolve(transition)?;

        if !self.is_enabled_at(idx) {
            self.publish(|| {
                Event::new(EventKind::TransitionSkipped)
                    .with_net(self.id)
                    .with_transition(Arc::clone(&self.nodes[idx].name))
            });
            return Ok(Fired::Skipped);
        }

        self.debit(idx);
        if let Some(body) = self.nodes[idx]
            .body
            .as_any_mut()
            .downcast_mut::<TypedBody<T>>()
        {
            body.invoke(payload);
        }
        self.credit(idx, None);

        let outcome = self.propagate();
        // the direct fire happened even if the cascade was cut short
        let auto_fired = match &outcome {
            Ok(n) => *n,
            Err(FireError::CascadeLimit { limit, .. }) => *limit,
            Err(_) => 0,
        };
        self.publish(|| {
            Event::new(EventKind::TransitionFired)
                .with_net(self.id)
                .with_transition(Arc::clone(&self.nodes[idx].name))
                .with_auto_fired(auto_fired)
        });
        outcome.map(|auto_fired| Fired::Fired { auto_fired })
    }

    /// Returns `true` if every input place of `transition` holds enough tokens.
    ///
    /// Handles of another net are never enabled.
    pub fn is_enabled<T>(&self, transition: &TransitionHandle<T>) -> bool {
        transition.net == self.id
            && transition.index < self.nodes.len()
            && self.is_enabled_at(transition.index)
    }

    /// Current tokens of a place, `None` for a place of another net.
    pub fn tokens(&self, place: PlaceId) -> Option<u32> {
        self.place(place).map(Place::tokens)
    }

    /// Read access to a place.
    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        if place.net != self.id {
            return None;
        }
        self.places.get(place.index)
    }

    /// Snapshot of all token counts.
    pub fn marking(&self) -> Marking {
        Marking(self.places.iter().map(Place::tokens).collect())
    }

    /// Name of a registered transition.
    pub fn transition_name<T>(&self, transition: &TransitionHandle<T>) -> Option<&str> {
        if transition.net != self.id {
            return None;
        }
        self.nodes.get(transition.index).map(|n| &*n.name)
    }

    /// Number of places.
    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    /// Number of transitions.
    pub fn transition_count(&self) -> usize {
        self.nodes.len()
    }

    /// Net identity, as carried by events and handles.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Configuration the net was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Attached event bus, if any.
    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }

    /// Attaches (or replaces) the event bus.
    pub fn set_bus(&mut self, bus: Bus) {
        self.bus = Some(bus);
    }

    fn resolve<T: 'static>(&self, transition: &TransitionHandle<T>) -> Result<usize, FireError> {
        if transition.net != self.id {
            return Err(FireError::ForeignTransition);
        }
        match self.nodes.get(transition.index) {
            Some(node) if node.body.as_any().is::<TypedBody<T>>() => Ok(transition.index),
            _ => Err(FireError::ForeignTransition),
        }
    }

    fn is_enabled_at(&self, idx: usize) -> bool {
        self.nodes[idx]
            .inputs
            .iter()
            .all(|&(place, n)| self.places[place].has(n))
    }

    /// Debits the inputs of an enabled transition.
    fn debit(&mut self, idx: usize) {
        for &(place, n) in &self.nodes[idx].inputs {
            let taken = self.places[place].try_consume(n);
            debug_assert!(taken, "debit of an enabled transition cannot fail");
        }
    }

    /// Credits the outputs of `idx`; with `rearm`, clears the pass marks of
    /// the other transitions fed by a place that actually gained tokens.
    fn credit(&mut self, idx: usize, mut rearm: Option<&mut [bool]>) {
        for &(place, n) in &self.nodes[idx].outputs {
            let discarded = self.places[place].produce(n);
            if discarded > 0 {
                self.publish(|| {
                    Event::new(EventKind::TokensClamped)
                        .with_net(self.id)
                        .with_transition(Arc::clone(&self.nodes[idx].name))
                        .with_place(self.places[place].name())
                        .with_tokens(discarded)
                });
            }
            if discarded < n
                && let Some(fired) = rearm.as_deref_mut()
            {
                for &consumer in &self.consumers[place] {
                    if consumer != idx {
                        fired[consumer] = false;
                    }
                }
            }
        }
    }

    /// Runs auto-fire transitions until a full scan finds none enabled.
    fn propagate(&mut self) -> Result<usize, FireError> {
        let limit = self.cfg.cascade_limit();
        let mut fired = vec![false; self.nodes.len()];
        let mut count = 0usize;

        loop {
            let mut progressed = false;

            for idx in 0..self.nodes.len() {
                if !self.nodes[idx].auto_fire || fired[idx] || !self.is_enabled_at(idx) {
                    continue;
                }
                if limit.is_some_and(|max| count >= max) {
                    return Err(self.cascade_limit_hit(idx, count));
                }

                self.debit(idx);
                self.nodes[idx].body.invoke_default();
                fired[idx] = true;
                self.credit(idx, Some(fired.as_mut_slice()));

                count += 1;
                progressed = true;
                self.publish(|| {
                    Event::new(EventKind::AutoFired)
                        .with_net(self.id)
                        .with_transition(Arc::clone(&self.nodes[idx].name))
                });
            }

            if !progressed {
                return Ok(count);
            }
        }
    }

    fn cascade_limit_hit(&self, idx: usize, limit: usize) -> FireError {
        let name = &self.nodes[idx].name;
        tracing::warn!(
            net = self.id,
            transition = %name,
            limit,
            "auto-fire cascade limit reached"
        );
        self.publish(|| {
            Event::new(EventKind::CascadeLimitHit)
                .with_net(self.id)
                .with_transition(Arc::clone(name))
                .with_reason(format!("limit={limit}"))
        });
        FireError::CascadeLimit {
            limit,
            transition: name.to_string(),
        }
    }

    #[inline]
    fn publish(&self, build: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus
            && bus.has_receivers()
        {
            bus.publish(build());
        }
    }
}
