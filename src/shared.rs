//! # Thread-shared net
//!
//! [`SharedNet`] lets several threads fire transitions on one [`PetriNet`].
//! The lock is held for the whole `fire` call (debit, action, credit and
//! propagation), so every fire observes a marking left by a complete fire.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{Fired, Marking, PetriNet, PlaceId, TransitionHandle};
use crate::error::FireError;

/// Cloneable handle to a net guarded by a mutex.
#[derive(Clone)]
pub struct SharedNet {
    inner: Arc<Mutex<PetriNet>>,
}

impl SharedNet {
    /// Wraps `net` for use from several threads.
    pub fn new(net: PetriNet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(net)),
        }
    }

    /// Fires `transition` while holding the lock for the entire call.
    ///
    /// Returns [`FireError::Poisoned`] if an earlier action panicked under the lock.
    pub fn fire<T: Send + 'static>(
        &self,
        transition: &TransitionHandle<T>,
        payload: T,
    ) -> Result<Fired, FireError> {
        self.lock()?.fire(transition, payload)
    }

    /// Current tokens of a place.
    pub fn tokens(&self, place: PlaceId) -> Result<Option<u32>, FireError> {
        Ok(self.lock()?.tokens(place))
    }

    /// Snapshot of all token counts.
    pub fn marking(&self) -> Result<Marking, FireError> {
        Ok(self.lock()?.marking())
    }

    /// Runs `f` with exclusive access to the net.
    pub fn with<R>(&self, f: impl FnOnce(&mut PetriNet) -> R) -> Result<R, FireError> {
        let mut net = self.lock()?;
        Ok(f(&mut net))
    }

    /// Returns the net if this is the last handle.
    pub fn into_inner(self) -> Option<PetriNet> {
        Arc::into_inner(self.inner).and_then(|m| m.into_inner().ok())
    }

    fn lock(&self) -> Result<MutexGuard<'_, PetriNet>, FireError> {
        self.inner.lock().map_err(|_| FireError::Poisoned)
    }
}

impl From<PetriNet> for SharedNet {
    fn from(net: PetriNet) -> Self {
        Self::new(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{Place, Transition};
    use std::thread;

    #[test]
    fn test_fires_from_many_threads_are_serialised() {
        let mut b = PetriNet::builder(Config::default());
        let queued = b.place(Place::new("queued")).unwrap();
        let done = b.place(Place::new("done")).unwrap();
        let submit = b
            .transition(Transition::<()>::new("submit").output(queued, 1))
            .unwrap();
        b.transition(
            Transition::<()>::new("complete")
                .input(queued, 1)
                .output(done, 1)
                .auto_fire(),
        )
        .unwrap();
        let shared = SharedNet::new(b.build());

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(
                            shared.fire(&submit, ()).unwrap(),
                            Fired::Fired { auto_fired: 1 }
                        );
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(shared.tokens(queued).unwrap(), Some(0));
        assert_eq!(shared.tokens(done).unwrap(), Some(800));
        assert!(shared.into_inner().is_some());
    }

    #[test]
    fn test_panicking_action_poisons_the_net() {
        let mut b = PetriNet::builder(Config::default());
        let boom = b
            .transition(Transition::<()>::new("boom").action(|_| panic!("action failed")))
            .unwrap();
        let shared = SharedNet::new(b.build());

        let other = shared.clone();
        assert!(thread::spawn(move || other.fire(&boom, ())).join().is_err());

        assert_eq!(shared.fire(&boom, ()), Err(FireError::Poisoned));
        assert_eq!(shared.marking().unwrap_err().as_label(), "fire_poisoned");
    }

    #[test]
    fn test_with_gives_exclusive_access() {
        let mut b = PetriNet::builder(Config::default());
        let p = b.place(Place::new("p").with_tokens(2)).unwrap();
        let take = b
            .transition(Transition::<()>::new("take").input(p, 1))
            .unwrap();
        let shared: SharedNet = b.build().into();

        let left = shared
            .with(|net| {
                net.fire(&take, ()).unwrap();
                net.tokens(p)
            })
            .unwrap();
        assert_eq!(left, Some(1));
        assert_eq!(shared.marking().unwrap().total(), 1);
    }
}
