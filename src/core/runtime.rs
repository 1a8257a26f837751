//! # Runtime — spawning, root management, engine shutdown.
//!
//! [`Runtime`] hosts the ownership tree: it spawns root objects, carries the
//! event bus and subscriber fan-out, and drives the engine-level shutdown
//! sequence.
//!
//! ## Architecture
//! ```text
//!  Runtime ── spawn_root() ──► Spawner ── tokio::spawn ──► ObjectActor (root)
//!     │                           ▲                             │
//!     │                           └── ObjectCore::launch ───────┤ (children)
//!     │                                                         │
//!     └─ shutdown(): stop roots ──► tree converges ──► presence channel drains
//!            │                                               │
//!            └── grace timer ── exceeded ──► force cancel + stuck report
//! ```
//!
//! ## Shutdown sequence
//! 1. Publish `ShutdownRequested`, send a stop to every root.
//! 2. Wait for the presence channel to drain: every actor holds one sender
//!    clone, so `recv() == None` means every worker has exited.
//! 3. Within grace → `Ok(())`. Grace exceeded → cancel the force token,
//!    snapshot still-alive objects, return
//!    [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded).
//! 4. Either way, stop the bus listener (it forwards whatever is still
//!    buffered) and drain + join the subscriber workers, so nothing of the
//!    fan-out outlives the runtime.
//!
//! Linger is advisory and bounds *object-level* draining; grace is the hard
//! engine-level bound and is the only timer the runtime itself enforces.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::commands::{self, Linger, ObjectHandle};
use crate::core::actor::ObjectActor;
use crate::core::builder::RuntimeBuilder;
use crate::core::{Config, ObjectCore};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::objects::Lifecycle;
use crate::subscribers::{AliveTracker, SubscriberSet};

/// Shared object factory.
///
/// Every [`ObjectCore`] holds a clone so hooks can launch children; the
/// runtime holds one for roots. Cloning is cheap (channel handles + token).
#[derive(Clone)]
pub(crate) struct Spawner {
    bus: Bus,
    linger: Linger,
    force: CancellationToken,
    presence: mpsc::Sender<()>,
}

impl Spawner {
    pub(crate) fn new(
        bus: Bus,
        linger: Linger,
        force: CancellationToken,
        presence: mpsc::Sender<()>,
    ) -> Self {
        Self {
            bus,
            linger,
            force,
            presence,
        }
    }

    /// Creates the mailbox, core and worker for a new object and returns its
    /// handle. Linking into the tree is the caller's business.
    pub(crate) fn spawn(&self, lifecycle: Box<dyn Lifecycle>) -> ObjectHandle {
        let (handle, rx) = commands::channel(lifecycle.name());
        let core = ObjectCore::new(handle.clone(), self.linger, self.bus.clone(), self.clone());
        let actor = ObjectActor::new(core, lifecycle, rx, self.force.clone(), self.presence.clone());
        tokio::spawn(actor.run());
        handle
    }
}

/// Hosts the ownership tree and its ambient machinery.
///
/// Built via [`Runtime::builder`]; must be created inside a Tokio runtime
/// (building spawns the subscriber fan-out tasks).
pub struct Runtime {
    pub(crate) cfg: Config,
    pub(crate) bus: Bus,
    pub(crate) subs: Arc<SubscriberSet>,
    pub(crate) alive: Arc<AliveTracker>,
    pub(crate) spawner: Spawner,
    pub(crate) presence_rx: mpsc::Receiver<()>,
    pub(crate) force: CancellationToken,
    pub(crate) roots: Vec<ObjectHandle>,
    pub(crate) listener_stop: CancellationToken,
    pub(crate) listener: JoinHandle<()>,
}

impl Runtime {
    /// Starts building a runtime with the given configuration.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    /// The event bus; subscribe directly for ad-hoc observation.
    #[inline]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Eventually-consistent liveness view of the tree.
    #[inline]
    pub fn alive(&self) -> &Arc<AliveTracker> {
        &self.alive
    }

    /// Spawns an ownerless root object and plugs it in.
    ///
    /// Roots are remembered so [`shutdown`](Runtime::shutdown) can stop them.
    pub fn spawn_root(&mut self, lifecycle: Box<dyn Lifecycle>) -> ObjectHandle {
        let handle = self.spawner.spawn(lifecycle);
        handle.send_plug(None);
        self.roots.push(handle.clone());
        handle
    }

    /// Stops every root and waits for the whole tree to converge.
    ///
    /// Consumes the runtime: no further spawning is possible. Returns
    /// `Ok(())` once every object has been destroyed, or
    /// [`RuntimeError::GraceExceeded`] with the names of still-alive objects
    /// if the grace period runs out first (stalled workers are then
    /// force-cancelled and abandoned).
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        let Runtime {
            cfg,
            bus,
            subs,
            alive,
            spawner,
            mut presence_rx,
            force,
            roots,
            listener_stop,
            listener,
        } = self;

        bus.publish(Event::new(EventKind::ShutdownRequested));
        for root in &roots {
            // Tolerates roots that already terminated on their own.
            root.request_stop();
        }
        // Our own presence sender must go, or the channel never drains.
        drop(spawner);

        let drained = async {
            while presence_rx.recv().await.is_some() {}
        };
        match tokio::time::timeout(cfg.grace, drained).await {
            Ok(()) => {
                bus.publish(Event::new(EventKind::AllStoppedWithin));
                drain_fanout(subs, listener_stop, listener).await;
                Ok(())
            }
            Err(_) => {
                bus.publish(Event::new(EventKind::GraceExceeded));
                force.cancel();
                // Tear the fan-out down first so the liveness snapshot has
                // seen every event published up to the deadline.
                drain_fanout(subs, listener_stop, listener).await;
                let stuck = alive.snapshot().await;
                Err(RuntimeError::GraceExceeded {
                    grace: cfg.grace,
                    stuck,
                })
            }
        }
    }
}

/// Stops the bus listener, then drains and joins the subscriber workers.
///
/// The listener forwards everything still buffered before it exits; once it
/// is gone the set has no other holder and can be consumed.
async fn drain_fanout(
    subs: Arc<SubscriberSet>,
    listener_stop: CancellationToken,
    listener: JoinHandle<()>,
) {
    listener_stop.cancel();
    let _ = listener.await;
    if let Ok(set) = Arc::try_unwrap(subs) {
        set.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::objects::Inert;

    /// Tree node that launches its children on plug and records its own
    /// destruction.
    struct Branch {
        name: String,
        children: Vec<Box<dyn Lifecycle>>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Branch {
        fn new(
            name: &str,
            children: Vec<Box<dyn Lifecycle>>,
            log: Arc<Mutex<Vec<String>>>,
        ) -> Self {
            Self {
                name: name.to_string(),
                children,
                log,
            }
        }
    }

    #[async_trait]
    impl Lifecycle for Branch {
        fn name(&self) -> &str {
            &self.name
        }

        async fn on_plug(&mut self, core: &mut ObjectCore) {
            for child in self.children.drain(..) {
                core.launch(child);
            }
        }

        async fn on_destroy(&mut self) {
            self.log.lock().unwrap().push(self.name.clone());
        }
    }

    /// Never finishes draining; used to exhaust the shutdown grace.
    struct Stuck {
        name: String,
    }

    #[async_trait]
    impl Lifecycle for Stuck {
        fn name(&self) -> &str {
            &self.name
        }

        async fn on_term(&mut self, _core: &mut ObjectCore, _linger: Linger) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }

    async fn wait_alive(alive: &AliveTracker, names: &[&str]) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let mut up = true;
                for name in names {
                    if !alive.is_alive(name).await {
                        up = false;
                        break;
                    }
                }
                if up {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("tree never came up");
    }

    fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ev) => out.push(ev),
                Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        out
    }

    fn count(events: &[Event], kind: EventKind, object: &str) -> usize {
        events
            .iter()
            .filter(|e| e.kind == kind && e.object.as_deref() == Some(object))
            .count()
    }

    #[tokio::test]
    async fn test_tree_shutdown_converges_within_grace() {
        let cfg = Config {
            linger: Linger::millis(500),
            grace: Duration::from_secs(5),
            ..Config::default()
        };
        let mut rt = Runtime::builder(cfg).build();

        let log = Arc::new(Mutex::new(Vec::new()));
        let c = Branch::new("c", vec![], log.clone());
        let b = Branch::new("b", vec![Box::new(c)], log.clone());
        let a = Branch::new("a", vec![], log.clone());
        let r = Branch::new("r", vec![Box::new(a), Box::new(b)], log.clone());

        rt.spawn_root(Box::new(r));
        wait_alive(rt.alive(), &["r", "a", "b", "c"]).await;

        let mut evrx = rt.bus().subscribe();
        rt.shutdown().await.expect("tree failed to converge");

        let mut destroyed = log.lock().unwrap().clone();
        destroyed.sort();
        assert_eq!(destroyed, vec!["a", "b", "c", "r"]);

        let events = drain_events(&mut evrx);
        // R waits for A and B, B waits for C.
        assert_eq!(count(&events, EventKind::AckReceived, "r"), 2);
        assert_eq!(count(&events, EventKind::AckReceived, "b"), 1);
        for name in ["r", "a", "b", "c"] {
            assert_eq!(count(&events, EventKind::Destroyed, name), 1);
        }
        // The requester's linger rides the whole cascade.
        for ev in events.iter().filter(|e| e.kind == EventKind::TermStarted) {
            assert_eq!(ev.linger_ms, Some(500), "object {:?}", ev.object);
        }
        assert!(events.iter().any(|e| e.kind == EventKind::AllStoppedWithin));
    }

    #[tokio::test]
    async fn test_concurrent_stop_requests_destroy_once() {
        let mut rt = Runtime::builder(Config {
            grace: Duration::from_secs(5),
            ..Config::default()
        })
        .build();

        let mut evrx = rt.bus().subscribe();
        let root = rt.spawn_root(Box::new(Inert::new("r")));
        wait_alive(rt.alive(), &["r"]).await;

        let mut stoppers = Vec::new();
        for _ in 0..4 {
            let h = root.clone();
            stoppers.push(tokio::spawn(async move {
                for _ in 0..25 {
                    h.request_stop();
                }
            }));
        }
        for s in stoppers {
            s.await.unwrap();
        }

        rt.shutdown().await.expect("tree failed to converge");

        let events = drain_events(&mut evrx);
        assert_eq!(count(&events, EventKind::TermStarted, "r"), 1);
        assert_eq!(count(&events, EventKind::Destroyed, "r"), 1);
    }

    #[tokio::test]
    async fn test_grace_exceeded_names_stuck_objects() {
        let mut rt = Runtime::builder(Config {
            grace: Duration::from_millis(100),
            ..Config::default()
        })
        .build();

        rt.spawn_root(Box::new(Stuck {
            name: "anchor".to_string(),
        }));
        wait_alive(rt.alive(), &["anchor"]).await;

        let err = rt.shutdown().await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_grace_exceeded");
        match err {
            RuntimeError::GraceExceeded { grace, stuck } => {
                assert_eq!(grace, Duration::from_millis(100));
                assert!(stuck.contains(&"anchor".to_string()));
            }
        }
    }

    /// Records every event kind it is handed.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl crate::subscribers::Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_shutdown_drains_and_releases_fanout() {
        let recorder = Arc::new(Recorder::default());
        let mut rt = Runtime::builder(Config {
            grace: Duration::from_secs(5),
            ..Config::default()
        })
        .with_subscriber(recorder.clone() as Arc<dyn crate::subscribers::Subscribe>)
        .build();

        rt.spawn_root(Box::new(Inert::new("r")));
        wait_alive(rt.alive(), &["r"]).await;
        rt.shutdown().await.expect("tree failed to converge");

        // Workers were joined before shutdown returned, so the subscriber saw
        // everything up to and including the final runtime event.
        let seen = recorder.seen.lock().unwrap().clone();
        assert!(seen.contains(&EventKind::Destroyed));
        assert!(seen.contains(&EventKind::AllStoppedWithin));

        // And nothing of the fan-out survives: the worker's clone is gone,
        // leaving ours as the only reference.
        assert_eq!(Arc::strong_count(&recorder), 1);
    }

    #[tokio::test]
    async fn test_shutdown_tolerates_already_stopped_root() {
        let mut rt = Runtime::builder(Config {
            grace: Duration::from_secs(5),
            ..Config::default()
        })
        .build();

        let root = rt.spawn_root(Box::new(Inert::new("early")));
        wait_alive(rt.alive(), &["early"]).await;

        root.request_stop();
        // Give the root time to converge and drop its mailbox.
        tokio::time::timeout(Duration::from_secs(5), async {
            while rt.alive().is_alive("early").await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("root never stopped");

        rt.shutdown().await.expect("shutdown failed");
    }
}
