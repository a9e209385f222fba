//! # Transitions: reaction rules with a typed action.
//!
//! A [`Transition<T>`] lists the tokens it needs, the tokens it produces and
//! the action it runs with a payload of type `T`. Registering it on a
//! [`NetBuilder`](crate::NetBuilder) validates the arcs and returns a typed
//! [`TransitionHandle<T>`] that is later passed to `fire`.
//!
//! ```text
//!   inputs (place, n) ──► debit ──► action(payload) ──► credit ──► outputs (place, n)
//! ```
//!
//! Auto-fire transitions are fired by the engine itself during propagation
//! with `T::default()` as payload, so [`Transition::auto_fire`] is only
//! available for `T: Default` (for `()` this is the unit value).

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::core::place::PlaceId;

/// Boxed transition action.
pub(crate) type Action<T> = Box<dyn FnMut(T) + Send>;

/// A reaction rule, before registration.
///
/// ## Example
/// ```rust
/// use petrinet::{Config, PetriNet, Place, Transition};
///
/// let mut b = PetriNet::builder(Config::default());
/// let loaded = b.place(Place::new("loaded").with_capacity(1)).unwrap();
/// let on_load = b
///     .transition(Transition::<u64>::new("on_load").output(loaded, 1).action(|id| {
///         assert_eq!(id, 42);
///     }))
///     .unwrap();
///
/// let mut net = b.build();
/// assert!(net.fire(&on_load, 42).unwrap().is_fired());
/// assert_eq!(net.tokens(loaded), Some(1));
/// ```
pub struct Transition<T> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) inputs: Vec<(PlaceId, u32)>,
    pub(crate) outputs: Vec<(PlaceId, u32)>,
    pub(crate) action: Option<Action<T>>,
    pub(crate) auto: Option<fn() -> T>,
}

impl<T: Send + 'static> Transition<T> {
    /// Creates a transition with no arcs and a no-op action.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            action: None,
            auto: None,
        }
    }

    /// Requires `count` tokens from `place`.
    pub fn input(mut self, place: PlaceId, count: u32) -> Self {
        self.inputs.push((place, count));
        self
    }

    /// Produces `count` tokens into `place`.
    pub fn output(mut self, place: PlaceId, count: u32) -> Self {
        self.outputs.push((place, count));
        self
    }

    /// Sets the action run on every successful fire.
    pub fn action<F>(mut self, f: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        self.action = Some(Box::new(f));
        self
    }

    /// Transition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the engine may fire this transition on its own.
    pub fn is_auto_fire(&self) -> bool {
        self.auto.is_some()
    }
}

impl<T: Default + Send + 'static> Transition<T> {
    /// Marks the transition as auto-fire.
    pub fn auto_fire(mut self) -> Self {
        self.auto = Some(T::default);
        self
    }
}

impl<T> fmt::Debug for Transition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("auto_fire", &self.auto.is_some())
            .finish_non_exhaustive()
    }
}

/// Typed handle to a registered transition.
///
/// The payload type is fixed by the handle, so `fire` can only be called
/// with the payload the action expects.
pub struct TransitionHandle<T> {
    pub(crate) net: u64,
    pub(crate) index: usize,
    _payload: PhantomData<fn(T)>,
}

impl<T> TransitionHandle<T> {
    pub(crate) fn new(net: u64, index: usize) -> Self {
        Self {
            net,
            index,
            _payload: PhantomData,
        }
    }

    /// Position of the transition in registration order.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for TransitionHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TransitionHandle<T> {}

impl<T> PartialEq for TransitionHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.net == other.net && self.index == other.index
    }
}

impl<T> Eq for TransitionHandle<T> {}

impl<T> fmt::Debug for TransitionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("net", &self.net)
            .field("index", &self.index)
            .finish()
    }
}

/// Type-erased action storage owned by the net.
pub(crate) trait Body: Send {
    /// Runs the action with the default payload (auto-fire path).
    fn invoke_default(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) struct TypedBody<T> {
    action: Option<Action<T>>,
    default: Option<fn() -> T>,
}

impl<T> TypedBody<T> {
    pub(crate) fn new(action: Option<Action<T>>, default: Option<fn() -> T>) -> Self {
        Self { action, default }
    }

    pub(crate) fn invoke(&mut self, payload: T) {
        if let Some(action) = self.action.as_mut() {
            action(payload);
        }
    }
}

impl<T: Send + 'static> Body for TypedBody<T> {
    fn invoke_default(&mut self) {
        if let Some(default) = self.default {
            self.invoke(default());
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
