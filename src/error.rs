//! Error types used by the petri net engine and its dispatcher.
//!
//! This module defines three error enums:
//!
//! - [`BuildError`]: programmer errors caught while wiring a graph.
//! - [`FireError`]: failures of a `fire` call that are **not** "transition disabled".
//! - [`DispatchError`]: failures of submitting work to a [`Dispatcher`](crate::Dispatcher).
//!
//! A disabled transition is never an error: `fire` reports it as
//! [`Fired::Skipped`](crate::Fired::Skipped).
//!
//! All types provide `as_label` for logging.

use thiserror::Error;

/// # Errors produced while building a net.
///
/// These are rejected by [`NetBuilder`](crate::NetBuilder) at construction time,
/// never at fire time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A transition requires or produces zero tokens on some arc.
    #[error("transition {transition:?}: arc to place {place:?} has a zero token count")]
    ZeroWeight {
        /// Transition name.
        transition: String,
        /// Place name.
        place: String,
    },

    /// A place was declared with a capacity of zero.
    #[error("place {place:?}: capacity must be at least 1")]
    ZeroCapacity {
        /// Place name.
        place: String,
    },

    /// A place starts with more tokens than its capacity allows.
    #[error("place {place:?}: {tokens} initial tokens exceed capacity {capacity}")]
    InitialTokensExceedCapacity {
        /// Place name.
        place: String,
        /// Requested initial tokens.
        tokens: u32,
        /// Declared capacity.
        capacity: u32,
    },

    /// The same place appears twice among the inputs (or twice among the outputs) of one transition.
    #[error("transition {transition:?}: place {place:?} is listed twice on the same side")]
    DuplicateArc {
        /// Transition name.
        transition: String,
        /// Place name.
        place: String,
    },

    /// Two places share a name.
    #[error("place {place:?} already exists")]
    DuplicatePlace {
        /// Place name.
        place: String,
    },

    /// Two transitions share a name.
    #[error("transition {transition:?} already exists")]
    DuplicateTransition {
        /// Transition name.
        transition: String,
    },

    /// A transition references a place created by another builder.
    #[error("transition {transition:?} references a place of another net")]
    ForeignPlace {
        /// Transition name.
        transition: String,
    },

    /// An auto-fire transition without inputs would be enabled on every pass.
    #[error("transition {transition:?} is auto-fire but has no inputs")]
    UnguardedAutoFire {
        /// Transition name.
        transition: String,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use petrinet::BuildError;
    ///
    /// let err = BuildError::ZeroCapacity { place: "waiting".into() };
    /// assert_eq!(err.as_label(), "build_zero_capacity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::ZeroWeight { .. } => "build_zero_weight",
            BuildError::ZeroCapacity { .. } => "build_zero_capacity",
            BuildError::InitialTokensExceedCapacity { .. } => "build_initial_tokens_exceed_capacity",
            BuildError::DuplicateArc { .. } => "build_duplicate_arc",
            BuildError::DuplicatePlace { .. } => "build_duplicate_place",
            BuildError::DuplicateTransition { .. } => "build_duplicate_transition",
            BuildError::ForeignPlace { .. } => "build_foreign_place",
            BuildError::UnguardedAutoFire { .. } => "build_unguarded_auto_fire",
        }
    }
}

/// # Errors produced by a `fire` call.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FireError {
    /// The handle was issued by another net.
    #[error("transition handle belongs to another net")]
    ForeignTransition,

    /// Auto-fire propagation exceeded [`Config::max_auto_fires`](crate::Config::max_auto_fires).
    ///
    /// This is a topology defect: some auto-fire transitions keep re-enabling each other.
    #[error("auto-fire cascade exceeded {limit} steps at transition {transition:?}")]
    CascadeLimit {
        /// The configured limit.
        limit: usize,
        /// The auto-fire transition that would have exceeded it.
        transition: String,
    },

    /// The lock of a [`SharedNet`](crate::SharedNet) was poisoned by a panicking action.
    #[error("net lock poisoned by a panicking action")]
    Poisoned,
}

impl FireError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FireError::ForeignTransition => "fire_foreign_transition",
            FireError::CascadeLimit { .. } => "fire_cascade_limit",
            FireError::Poisoned => "fire_poisoned",
        }
    }
}

/// Error returned by [`DispatchHandle`](crate::DispatchHandle).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Request queue is full (try again later or use async `fire`).
    #[error("dispatch queue full")]
    Full,

    /// Dispatcher loop has stopped.
    #[error("dispatcher closed")]
    Closed,

    /// Dispatcher task panicked (an action panicked while the loop owned the net).
    #[error("dispatcher task crashed")]
    Crashed,

    /// The request reached the net but the fire failed.
    #[error(transparent)]
    Fire(#[from] FireError),
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Full => "dispatch_full",
            DispatchError::Closed => "dispatch_closed",
            DispatchError::Crashed => "dispatch_crashed",
            DispatchError::Fire(e) => e.as_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_wraps_fire_error_label() {
        let err: DispatchError = FireError::ForeignTransition.into();
        assert_eq!(err.as_label(), "fire_foreign_transition");
        assert_eq!(err.to_string(), "transition handle belongs to another net");
    }

    #[test]
    fn test_cascade_limit_message() {
        let err = FireError::CascadeLimit {
            limit: 8,
            transition: "refresh".into(),
        };
        assert_eq!(
            err.to_string(),
            "auto-fire cascade exceeded 8 steps at transition \"refresh\""
        );
    }
}
