//! # Net runtime configuration.
//!
//! Provides [`Config`] centralized settings for a [`PetriNet`](crate::PetriNet)
//! and the [`Dispatcher`](crate::Dispatcher) that may own it.
//!
//! Config is used in two ways:
//! 1. **Net creation**: `PetriNet::builder(config)`
//! 2. **Dispatcher creation**: `Dispatcher::spawn` reads the queue capacity from the net's config
//!
//! ## Sentinel values
//! - `max_auto_fires = 0` → unlimited cascade (no hang protection)
//! - `bus_capacity` / `queue_capacity` are clamped to a minimum of 1

/// Configuration for a net and its dispatcher.
///
/// ## Field semantics
/// - `max_auto_fires`: Auto-fires allowed per external `fire` call (`0` = unlimited)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `queue_capacity`: Dispatcher request queue size (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of auto-fire steps a single `fire` call may cascade into.
    ///
    /// - `0` = unlimited
    /// - `n > 0` = the `n + 1`-th auto-fire fails with `FireError::CascadeLimit`
    pub max_auto_fires: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    ///
    /// A single `fire` publishes up to `max_auto_fires` plus a few events at once
    /// (more with clamping), so keep this well above `max_auto_fires`.
    pub bus_capacity: usize,

    /// Capacity of the dispatcher request queue.
    ///
    /// When full, `DispatchHandle::fire` waits and `try_fire` returns `DispatchError::Full`.
    pub queue_capacity: usize,
}

impl Config {
    /// Returns the cascade limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` auto-fires per external fire
    #[inline]
    pub fn cascade_limit(&self) -> Option<usize> {
        if self.max_auto_fires == 0 {
            None
        } else {
            Some(self.max_auto_fires)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_auto_fires = 1024`
    /// - `bus_capacity = 4096`
    /// - `queue_capacity = 256`
    fn default() -> Self {
        Self {
            max_auto_fires: 1024,
            bus_capacity: 4096,
            queue_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_unlimited_cascade() {
        let cfg = Config {
            max_auto_fires: 0,
            ..Config::default()
        };
        assert_eq!(cfg.cascade_limit(), None);
        assert_eq!(Config::default().cascade_limit(), Some(1024));
    }

    #[test]
    fn test_default_bus_holds_a_full_cascade() {
        let cfg = Config::default();
        // each auto-fire may publish AutoFired and TokensClamped
        assert!(cfg.bus_capacity_clamped() > 2 * cfg.max_auto_fires + 2);
    }

    #[test]
    fn test_capacities_clamped() {
        let cfg = Config {
            max_auto_fires: 1,
            bus_capacity: 0,
            queue_capacity: 0,
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
    }
}
