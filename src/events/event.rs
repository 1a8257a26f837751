//! # Runtime events emitted by object actors and the runtime.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Tree events**: ownership and termination flow of individual objects
//! - **Runtime events**: engine-level shutdown progress
//! - **Subscriber events**: delivery problems in the fan-out itself
//!
//! The [`Event`] struct carries optional metadata: object and peer names,
//! the linger value on terminate commands, outstanding-ack counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order across subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::commands::Linger;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Tree events ===
    /// Object finished local setup on its own worker.
    ///
    /// Sets: `object`, `at`, `seq`.
    Plugged,

    /// Owner registered a launched child in its ownership set.
    ///
    /// Sets: `object` (owner), `peer` (child), `at`, `seq`.
    OwnershipTaken,

    /// Child arrived after its owner had begun terminating; it was sent an
    /// immediate terminate (linger = 0) instead of being registered.
    ///
    /// Sets: `object` (owner), `peer` (child), `at`, `seq`.
    LateChildTerm,

    /// Object asked its owner to terminate it.
    ///
    /// Sets: `object` (child), `peer` (owner), `at`, `seq`.
    TermRequested,

    /// Object began its own termination and cascaded to its children.
    ///
    /// Sets: `object`, `linger_ms`, `acks` (children cascaded to), `at`, `seq`.
    TermStarted,

    /// Object received one termination acknowledgement from a child.
    ///
    /// Sets: `object`, `acks` (still outstanding), `at`, `seq`.
    AckReceived,

    /// Object converged and was destroyed.
    ///
    /// Sets: `object`, `at`, `seq`.
    Destroyed,

    // === Runtime events ===
    /// Engine shutdown requested; stop was sent to every root.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// The whole tree drained within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some objects did not converge in time.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `object` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `object` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the object this event is about, if applicable.
    pub object: Option<Arc<str>>,
    /// The other party (child or owner), if applicable.
    pub peer: Option<Arc<str>>,
    /// Raw linger value carried on a terminate command (`-1` = infinite).
    pub linger_ms: Option<i32>,
    /// Pending-ack count attached to the event (see the kind's docs).
    pub acks: Option<u32>,
    /// Human-readable reason (subscriber overflow details, panic info).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            object: None,
            peer: None,
            linger_ms: None,
            acks: None,
            reason: None,
        }
    }

    /// Attaches the name of the object the event is about.
    #[inline]
    pub fn with_object(mut self, object: impl Into<Arc<str>>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Attaches the other party's name (child or owner).
    #[inline]
    pub fn with_peer(mut self, peer: impl Into<Arc<str>>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Attaches the linger carried on a terminate command.
    #[inline]
    pub fn with_linger(mut self, linger: Linger) -> Self {
        self.linger_ms = Some(linger.as_raw());
        self
    }

    /// Attaches a pending-ack count.
    #[inline]
    pub fn with_acks(mut self, acks: u32) -> Self {
        self.acks = Some(acks);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_object(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_object(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::Plugged);
        let b = Event::new(EventKind::Plugged);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::TermStarted)
            .with_object("router")
            .with_peer("session-1")
            .with_linger(Linger::millis(500))
            .with_acks(2);

        assert_eq!(ev.kind, EventKind::TermStarted);
        assert_eq!(ev.object.as_deref(), Some("router"));
        assert_eq!(ev.peer.as_deref(), Some("session-1"));
        assert_eq!(ev.linger_ms, Some(500));
        assert_eq!(ev.acks, Some(2));
    }

    #[test]
    fn test_infinite_linger_keeps_wire_sentinel() {
        let ev = Event::new(EventKind::TermStarted).with_linger(Linger::INFINITE);
        assert_eq!(ev.linger_ms, Some(-1));
    }
}
