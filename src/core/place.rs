//! # Places: bounded token counters.
//!
//! A [`Place`] holds "N pending occurrences of some condition". It is declared
//! on a [`NetBuilder`](crate::NetBuilder) and referenced afterwards through a
//! [`PlaceId`] handle.
//!
//! ## Rules
//! - `0 <= tokens <= capacity` holds after every mutation.
//! - [`Place::try_consume`] is all-or-nothing.
//! - [`Place::produce`] clamps at capacity: a second "item loaded" event into a
//!   capacity-1 place collapses into the pending one instead of queuing.

use std::borrow::Cow;
use std::num::NonZeroU32;

/// Handle to a place inside one net.
///
/// Carries the id of the builder that issued it so that handles of another
/// net are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceId {
    pub(crate) net: u64,
    pub(crate) index: usize,
}

impl PlaceId {
    /// Position of the place in the net (and in a [`Marking`]).
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Token holder with an optional capacity ceiling.
///
/// ## Example
/// ```rust
/// use petrinet::Place;
///
/// let mut p = Place::new("waiting-for-item").with_capacity(1);
/// assert_eq!(p.produce(1), 0);
/// assert_eq!(p.produce(1), 1); // clamped, one token discarded
/// assert_eq!(p.tokens(), 1);
/// assert!(p.try_consume(1));
/// assert!(!p.try_consume(1));
/// ```
#[derive(Debug, Clone)]
pub struct Place {
    name: Cow<'static, str>,
    tokens: u32,
    capacity: Option<u32>,
}

impl Place {
    /// Creates an empty, unbounded place.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            tokens: 0,
            capacity: None,
        }
    }

    /// Sets the capacity ceiling.
    ///
    /// `0` is rejected by the builder with `BuildError::ZeroCapacity`.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the initial token count.
    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = tokens;
        self
    }

    /// Place name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current token count.
    #[inline]
    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    /// Capacity ceiling, `None` when unbounded.
    #[inline]
    pub fn capacity(&self) -> Option<NonZeroU32> {
        self.capacity.and_then(NonZeroU32::new)
    }

    /// Declared capacity, including an invalid `0` the builder has yet to reject.
    #[inline]
    pub(crate) fn raw_capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Returns `true` if at least `n` tokens are present.
    #[inline]
    pub fn has(&self, n: u32) -> bool {
        self.tokens >= n
    }

    /// Removes `n` tokens if present; otherwise leaves the place untouched.
    pub fn try_consume(&mut self, n: u32) -> bool {
        if self.tokens < n {
            return false;
        }
        self.tokens -= n;
        true
    }

    /// Adds `n` tokens, clamped at capacity.
    ///
    /// Returns the number of tokens discarded by the clamp.
    pub fn produce(&mut self, n: u32) -> u32 {
        let wanted = self.tokens.saturating_add(n);
        let kept = match self.capacity {
            Some(cap) => wanted.min(cap),
            None => wanted,
        };
        let added = kept.saturating_sub(self.tokens);
        self.tokens = self.tokens.max(kept);
        n - added
    }
}

/// Snapshot of the token count of every place in a net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marking(pub(crate) Vec<u32>);

impl Marking {
    /// Tokens of one place.
    pub fn get(&self, place: PlaceId) -> u32 {
        self.0.get(place.index).copied().unwrap_or(0)
    }

    /// Sum of tokens across all places.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&t| u64::from(t)).sum()
    }

    /// Token counts in place order.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_is_all_or_nothing() {
        let mut p = Place::new("p").with_tokens(2);
        assert!(!p.try_consume(3));
        assert_eq!(p.tokens(), 2);
        assert!(p.try_consume(2));
        assert_eq!(p.tokens(), 0);
    }

    #[test]
    fn test_capacity_clamp() {
        let mut p = Place::new("p").with_capacity(1).with_tokens(1);
        assert_eq!(p.produce(1), 1);
        assert_eq!(p.tokens(), 1);
    }

    #[test]
    fn test_partial_clamp_reports_discarded() {
        let mut p = Place::new("p").with_capacity(3).with_tokens(1);
        assert_eq!(p.produce(5), 3);
        assert_eq!(p.tokens(), 3);
    }

    #[test]
    fn test_unbounded_produce() {
        let mut p = Place::new("p");
        assert_eq!(p.produce(7), 0);
        assert_eq!(p.produce(u32::MAX), 7);
        assert_eq!(p.tokens(), u32::MAX);
        assert!(p.capacity().is_none());
    }
}
