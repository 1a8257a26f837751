//! # Runtime construction.
//!
//! [`RuntimeBuilder`] assembles a [`Runtime`]: the event bus, the subscriber
//! fan-out (an [`AliveTracker`] is always included — shutdown needs it to
//! name stuck objects), the bus→subscriber listener task, the force token and
//! the presence channel actors report their exit through.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::core::runtime::Spawner;
use crate::core::{Config, Runtime};
use crate::events::Bus;
use crate::subscribers::{AliveTracker, Subscribe, SubscriberSet};

/// Builder for [`Runtime`].
///
/// # Example
/// ```
/// use termvisor::{Config, Runtime};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let rt = Runtime::builder(Config::default()).build();
/// # drop(rt);
/// # }
/// ```
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RuntimeBuilder {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Adds one event subscriber.
    #[must_use]
    pub fn with_subscriber(mut self, sub: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(sub);
        self
    }

    /// Adds a batch of event subscribers.
    #[must_use]
    pub fn with_subscribers(mut self, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subs);
        self
    }

    /// Builds the runtime. Must run inside a Tokio runtime: this spawns the
    /// subscriber workers and the bus listener.
    pub fn build(self) -> Runtime {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let alive = Arc::new(AliveTracker::new());
        let mut subscribers = self.subscribers;
        subscribers.push(alive.clone() as Arc<dyn Subscribe>);
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        // Single listener forwards bus events into the fan-out. It pins the
        // set (which keeps a bus sender for overflow reporting), so it cannot
        // exit on channel closure; shutdown stops it via the token, after
        // which it forwards whatever is still buffered and returns.
        let listener_stop = CancellationToken::new();
        let mut rx = bus.subscribe();
        let set = Arc::clone(&subs);
        let stop = listener_stop.clone();
        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(&ev),
                                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
        });

        let force = CancellationToken::new();
        let (presence_tx, presence_rx) = mpsc::channel::<()>(1);
        let spawner = Spawner::new(bus.clone(), self.cfg.linger, force.clone(), presence_tx);

        Runtime {
            cfg: self.cfg,
            bus,
            subs,
            alive,
            spawner,
            presence_rx,
            force,
            roots: Vec::new(),
            listener_stop,
            listener,
        }
    }
}
