//! # Object liveness tracker with sequence-based ordering.
//!
//! Maintains authoritative state of which objects are currently alive, using
//! event sequence numbers to handle out-of-order observation.
//!
//! ## Architecture
//! ```text
//! actors ──► Bus ──► subscriber listener ──► AliveTracker::on_event()
//!                                                    │
//!                                                    ▼
//!                                      HashMap<String, ObjectState>
//!                                           (name → {seq, alive})
//! ```
//!
//! ## Rules
//! - Only `Plugged` / `Destroyed` change alive state
//! - Read operations (`snapshot`, `is_alive`) are **eventually consistent**
//! - The first event seen for an object is always applied; after that,
//!   events with `seq <= last_seq` are **rejected** (stale)

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-object state for ordering validation.
#[derive(Debug, Clone)]
struct ObjectState {
    /// Last seen sequence number for this object.
    last_seq: u64,
    /// Current status (true = alive, false = destroyed).
    alive: bool,
}

/// Thread-safe tracker of alive objects.
///
/// The runtime uses the final snapshot to name stuck objects when the
/// shutdown grace period is exceeded.
pub struct AliveTracker {
    state: RwLock<HashMap<String, ObjectState>>,
}

impl AliveTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Updates object state if the event is newer than the last seen one.
    ///
    /// - first event for an object → always applied (any seq, 0 included)
    /// - `Plugged` → alive=true, update seq
    /// - `Destroyed` → alive=false, update seq
    /// - other events → no state change, update seq only
    pub async fn update(&self, ev: &Event) -> bool {
        let name = match ev.object.as_deref() {
            Some(n) => n,
            None => return false,
        };

        let mut state = self.state.write().await;
        let entry = match state.entry(name.to_string()) {
            Entry::Vacant(slot) => slot.insert(ObjectState {
                last_seq: ev.seq,
                alive: false,
            }),
            Entry::Occupied(slot) => {
                let entry = slot.into_mut();
                if ev.seq <= entry.last_seq {
                    return false;
                }
                entry.last_seq = ev.seq;
                entry
            }
        };

        match ev.kind {
            EventKind::Plugged => {
                entry.alive = true;
                true
            }
            EventKind::Destroyed => {
                entry.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Returns a sorted list of currently alive object names.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, os)| os.alive)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }

    /// Returns true if the named object is currently alive.
    pub async fn is_alive(&self, name: &str) -> bool {
        self.state
            .read()
            .await
            .get(name)
            .map(|os| os.alive)
            .unwrap_or(false)
    }
}

impl Default for AliveTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for AliveTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "alive-tracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plug_and_destroy_flip_liveness() {
        let tracker = AliveTracker::new();

        tracker
            .update(&Event::new(EventKind::Plugged).with_object("io-thread"))
            .await;
        assert!(tracker.is_alive("io-thread").await);

        tracker
            .update(&Event::new(EventKind::Destroyed).with_object("io-thread"))
            .await;
        assert!(!tracker.is_alive("io-thread").await);
        assert!(tracker.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_first_event_applies_even_at_seq_zero() {
        let tracker = AliveTracker::new();

        // The very first event a process ever produces carries seq 0; a
        // fresh tracker entry must not treat it as stale.
        let mut plug = Event::new(EventKind::Plugged).with_object("root");
        plug.seq = 0;

        assert!(tracker.update(&plug).await);
        assert!(tracker.is_alive("root").await);
    }

    #[tokio::test]
    async fn test_stale_events_are_rejected() {
        let tracker = AliveTracker::new();

        let plug = Event::new(EventKind::Plugged).with_object("session");
        let destroy = Event::new(EventKind::Destroyed).with_object("session");

        // Deliver out of order: the older plug must not resurrect the object.
        tracker.update(&destroy).await;
        assert!(!tracker.update(&plug).await);
        assert!(!tracker.is_alive("session").await);
    }

    #[tokio::test]
    async fn test_snapshot_is_sorted() {
        let tracker = AliveTracker::new();
        for name in ["zeta", "alpha", "mid"] {
            tracker
                .update(&Event::new(EventKind::Plugged).with_object(name))
                .await;
        }
        assert_eq!(tracker.snapshot().await, vec!["alpha", "mid", "zeta"]);
    }
}
