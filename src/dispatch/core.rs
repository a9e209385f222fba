use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{Fired, PetriNet, TransitionHandle};
use crate::error::DispatchError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet, SubscriptionId};

/// Work executed by the loop against the owned net.
type Job = Box<dyn FnOnce(&mut PetriNet) + Send>;

enum Request {
    Fire(Job),
    Subscribe(Arc<dyn Subscribe>, oneshot::Sender<SubscriptionId>),
    Unsubscribe(SubscriptionId, oneshot::Sender<bool>),
}

/// Handle for submitting fire requests to a [`Dispatcher`].
///
/// Cheap to clone; hand one to every async source that reports events.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<Request>,
}

impl DispatchHandle {
    /// Fires a transition on the dispatcher's net and waits for the outcome.
    ///
    /// Waits for queue space if the queue is full.
    pub async fn fire<T: Send + 'static>(
        &self,
        transition: TransitionHandle<T>,
        payload: T,
    ) -> Result<Fired, DispatchError> {
        let (reply, outcome) = oneshot::channel();
        let job: Job = Box::new(move |net: &mut PetriNet| {
            let _ = reply.send(net.fire(&transition, payload));
        });

        self.tx
            .send(Request::Fire(job))
            .await
            .map_err(|_| DispatchError::Closed)?;

        let fired = outcome.await.map_err(|_| DispatchError::Closed)??;
        Ok(fired)
    }

    /// Queues a fire request without waiting (fails if the queue is full).
    ///
    /// The outcome is not reported back; fire errors are logged.
    pub fn try_fire<T: Send + 'static>(
        &self,
        transition: TransitionHandle<T>,
        payload: T,
    ) -> Result<(), DispatchError> {
        let job: Job = Box::new(move |net: &mut PetriNet| {
            if let Err(e) = net.fire(&transition, payload) {
                tracing::warn!(net = net.id(), error = %e, label = e.as_label(), "queued fire failed");
            }
        });

        self.tx.try_send(Request::Fire(job)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Registers a subscriber with the dispatcher's fan-out.
    pub async fn subscribe(&self, sub: Arc<dyn Subscribe>) -> Result<SubscriptionId, DispatchError> {
        let (reply, id) = oneshot::channel();
        self.tx
            .send(Request::Subscribe(sub, reply))
            .await
            .map_err(|_| DispatchError::Closed)?;
        id.await.map_err(|_| DispatchError::Closed)
    }

    /// Removes a subscriber; returns `false` if it was already removed.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, DispatchError> {
        let (reply, removed) = oneshot::channel();
        self.tx
            .send(Request::Unsubscribe(id, reply))
            .await
            .map_err(|_| DispatchError::Closed)?;
        removed.await.map_err(|_| DispatchError::Closed)
    }

    /// Returns `true` once the dispatcher loop has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single-owner async loop around a [`PetriNet`].
///
/// All fire requests are executed one at a time, in arrival order, on the
/// loop's task. Events published by the net are forwarded to the
/// [`SubscriberSet`].
pub struct Dispatcher {
    handle: DispatchHandle,
    token: CancellationToken,
    join: JoinHandle<PetriNet>,
}

impl Dispatcher {
    /// Spawns the loop with its own cancellation token.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(net: PetriNet, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self::spawn_with_token(net, subscribers, CancellationToken::new())
    }

    /// Spawns the loop; cancelling `token` stops it.
    ///
    /// If the net has no bus, one is created from its config and attached.
    pub fn spawn_with_token(
        mut net: PetriNet,
        subscribers: Vec<Arc<dyn Subscribe>>,
        token: CancellationToken,
    ) -> Self {
        let bus = match net.bus() {
            Some(bus) => bus.clone(),
            None => {
                let bus = Bus::new(net.config().bus_capacity_clamped());
                net.set_bus(bus.clone());
                bus
            }
        };
        let (tx, rx) = mpsc::channel(net.config().queue_capacity_clamped());
        let events = bus.subscribe();
        let subs = SubscriberSet::new(subscribers, bus.clone());

        let join = tokio::spawn(run(net, rx, events, subs, bus, token.clone()));
        Self {
            handle: DispatchHandle { tx },
            token,
            join,
        }
    }

    /// Returns a handle for submitting requests.
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Stops the loop and returns the net.
    ///
    /// Requests still queued are dropped; their callers observe `DispatchError::Closed`.
    pub async fn shutdown(self) -> Result<PetriNet, DispatchError> {
        self.token.cancel();
        self.join().await
    }

    /// Waits until the loop stops on its own and returns the net.
    ///
    /// The loop stops when the token is cancelled or every [`DispatchHandle`] is dropped.
    pub async fn join(self) -> Result<PetriNet, DispatchError> {
        let Self { handle, join, .. } = self;
        drop(handle);
        join.await.map_err(|_| DispatchError::Crashed)
    }
}

async fn run(
    mut net: PetriNet,
    mut rx: mpsc::Receiver<Request>,
    mut events: broadcast::Receiver<Event>,
    mut subs: SubscriberSet,
    bus: Bus,
    token: CancellationToken,
) -> PetriNet {
    let id = net.id();
    tracing::debug!(net = id, "dispatcher started");
    bus.publish(Event::new(EventKind::DispatcherStarted).with_net(id));

    let reason = loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break "cancelled",

            ev = events.recv() => match ev {
                Ok(ev) => subs.emit(&ev),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(net = id, skipped, "dispatcher listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {}
            },

            req = rx.recv() => match req {
                Some(Request::Fire(job)) => job(&mut net),
                Some(Request::Subscribe(sub, reply)) => {
                    let _ = reply.send(subs.add(sub));
                }
                Some(Request::Unsubscribe(sub, reply)) => {
                    let _ = reply.send(subs.remove(sub));
                }
                None => break "closed",
            },
        }
    };

    rx.close();
    bus.publish(
        Event::new(EventKind::DispatcherStopped)
            .with_net(id)
            .with_reason(reason),
    );
    loop {
        match events.try_recv() {
            Ok(ev) => subs.emit(&ev),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    subs.shutdown().await;

    tracing::debug!(net = id, reason, "dispatcher stopped");
    net
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{Place, Transition};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }
    }

    fn recording_net(cfg: Config) -> (PetriNet, TransitionHandle<u32>, Arc<Mutex<Vec<u32>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut b = PetriNet::builder(cfg);
        let t = b
            .transition(
                Transition::<u32>::new("loaded").action(move |v| sink.lock().unwrap().push(v)),
            )
            .unwrap();
        (b.build(), t, log)
    }

    #[tokio::test]
    async fn test_requests_run_in_submission_order() {
        let (net, t, log) = recording_net(Config::default());
        let dispatcher = Dispatcher::spawn(net, Vec::new());
        let handle = dispatcher.handle();

        for v in 0..5 {
            handle.try_fire(t, v).unwrap();
        }
        assert!(handle.fire(t, 5).await.unwrap().is_fired());

        let net = dispatcher.shutdown().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
        assert!(net.bus().is_some());
    }

    #[tokio::test]
    async fn test_try_fire_reports_full_queue() {
        let cfg = Config {
            queue_capacity: 1,
            ..Config::default()
        };
        let (net, t, _log) = recording_net(cfg);
        let dispatcher = Dispatcher::spawn(net, Vec::new());
        let handle = dispatcher.handle();

        // current-thread runtime: the loop has not run yet
        handle.try_fire(t, 1).unwrap();
        assert_eq!(handle.try_fire(t, 2), Err(DispatchError::Full));
        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_join_pattern_through_dispatcher() {
        let mut b = PetriNet::builder(Config::default());
        let item = b.place(Place::new("item").with_capacity(1)).unwrap();
        let sub = b.place(Place::new("sub").with_capacity(1)).unwrap();
        let item_loaded = b
            .transition(Transition::<()>::new("item_loaded").output(item, 1))
            .unwrap();
        let sub_loaded = b
            .transition(Transition::<()>::new("sub_loaded").output(sub, 1))
            .unwrap();
        b.transition(
            Transition::<()>::new("enable_switch")
                .input(item, 1)
                .input(sub, 1)
                .auto_fire(),
        )
        .unwrap();

        let dispatcher = Dispatcher::spawn(b.build(), Vec::new());
        let h1 = dispatcher.handle();
        let h2 = dispatcher.handle();

        let a = tokio::spawn(async move { h1.fire(item_loaded, ()).await });
        let b = tokio::spawn(async move { h2.fire(sub_loaded, ()).await });
        let total = a.await.unwrap().unwrap().auto_fired() + b.await.unwrap().unwrap().auto_fired();
        assert_eq!(total, 1);

        let net = dispatcher.shutdown().await.unwrap();
        assert_eq!(net.marking().total(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_events_until_unsubscribed() {
        let (net, t, _log) = recording_net(Config::default());
        let early = Arc::new(Collect::default());
        let late = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![early.clone()];
        let dispatcher = Dispatcher::spawn(net, subs);
        let handle = dispatcher.handle();

        let id = handle.subscribe(late.clone()).await.unwrap();
        assert!(handle.unsubscribe(id).await.unwrap());
        assert!(!handle.unsubscribe(id).await.unwrap());

        handle.fire(t, 7).await.unwrap();
        dispatcher.shutdown().await.unwrap();

        let early = early.seen.lock().unwrap();
        assert_eq!(early.first(), Some(&EventKind::DispatcherStarted));
        assert!(early.contains(&EventKind::TransitionFired));
        assert_eq!(early.last(), Some(&EventKind::DispatcherStopped));
        assert!(!late.seen.lock().unwrap().contains(&EventKind::TransitionFired));
    }

    #[tokio::test]
    async fn test_loop_stops_when_handles_dropped() {
        let (net, t, log) = recording_net(Config::default());
        let dispatcher = Dispatcher::spawn(net, Vec::new());
        let handle = dispatcher.handle();
        handle.try_fire(t, 3).unwrap();
        drop(handle);

        let net = dispatcher.join().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec![3]);
        assert_eq!(net.transition_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_reports_closed_after_shutdown() {
        let (net, t, _log) = recording_net(Config::default());
        let dispatcher = Dispatcher::spawn(net, Vec::new());
        let handle = dispatcher.handle();
        dispatcher.shutdown().await.unwrap();

        assert!(handle.is_closed());
        assert_eq!(handle.fire(t, 1).await, Err(DispatchError::Closed));
        assert_eq!(handle.try_fire(t, 1), Err(DispatchError::Closed));
    }

    #[tokio::test]
    async fn test_fire_error_is_returned_to_caller() {
        let (net, _t, _log) = recording_net(Config::default());
        let (_other, foreign, _) = recording_net(Config::default());
        let dispatcher = Dispatcher::spawn(net, Vec::new());

        let err = dispatcher.handle().fire(foreign, 1).await.unwrap_err();
        assert_eq!(err.as_label(), "fire_foreign_transition");
        dispatcher.shutdown().await.unwrap();
    }
}
