//! # Mailboxes: addressed, per-object command delivery.
//!
//! Every object owns exactly one inbound command channel, consumed solely by
//! its worker. [`ObjectHandle`] is the cheap, cloneable address other threads
//! use to reach it.
//!
//! ## Architecture
//! ```text
//! sender thread A ──┐
//! sender thread B ──┼── send_*() ──► [unbounded mpsc] ──► object actor (one worker)
//! sender thread N ──┘       │
//!                           └─► sent seqnum += 1 (atomic, before enqueue)
//! ```
//!
//! ## Rules
//! - The sent seqnum is bumped **before** the command is enqueued, by the
//!   sending thread. The target's worker bumps its processed seqnum after
//!   handling each command; the pair tracks in-flight commands.
//! - Per sender→target FIFO comes from the mpsc channel; nothing is promised
//!   across distinct senders.
//! - Protocol sends to an already-destroyed object are a contract violation
//!   and abort. The one exception is [`ObjectHandle::request_stop`], which is
//!   idempotent by definition and tolerates a target that is already gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use super::command::{Command, Linger};

/// Process-unique object identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric identity (stable for the process lifetime).
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Address of a live object: identity plus its command mailbox.
///
/// Handles are identity references only — cloning or holding one confers no
/// ownership and does not keep the object alive. Equality and hashing use the
/// [`ObjectId`] alone.
#[derive(Clone, Debug)]
pub struct ObjectHandle {
    id: ObjectId,
    name: Arc<str>,
    tx: mpsc::UnboundedSender<Command>,
    sent: Arc<AtomicU64>,
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ObjectHandle {}

impl std::hash::Hash for ObjectHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl ObjectHandle {
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Human-readable object name (for events and diagnostics).
    #[inline]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Atomic read of how many commands have ever been addressed to this object.
    ///
    /// The matching processed counter lives in the object core; the object may
    /// be destroyed only once the two are equal.
    #[inline]
    pub(crate) fn sent_seqnum(&self) -> u64 {
        // The mpsc channel orders the increment before the receive of the
        // command it accounts for, so Relaxed is enough here.
        self.sent.load(Ordering::Relaxed)
    }

    /// Externally request that this object begin its own termination.
    ///
    /// Safe to call from any thread, any number of times; termination is
    /// idempotent. Returns `false` if the object is already gone.
    pub fn request_stop(&self) -> bool {
        self.sent.fetch_add(1, Ordering::Relaxed);
        self.tx.send(Command::Stop).is_ok()
    }

    /// Delivers a protocol command, accounting it in the sent seqnum first.
    fn send(&self, cmd: Command) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(cmd).is_err() {
            // The protocol never addresses a destroyed object; getting here
            // means an ownership invariant was broken upstream.
            panic!("command sent to destroyed object `{}`", self.name);
        }
    }

    pub(crate) fn send_plug(&self, owner: Option<ObjectHandle>) {
        self.send(Command::Plug { owner });
    }

    pub(crate) fn send_own(&self, child: ObjectHandle) {
        self.send(Command::Own { child });
    }

    pub(crate) fn send_term(&self, linger: Linger) {
        self.send(Command::Term { linger });
    }

    pub(crate) fn send_term_req(&self, child: ObjectHandle) {
        self.send(Command::TermReq { child });
    }

    pub(crate) fn send_term_ack(&self) {
        self.send(Command::TermAck);
    }
}

/// Creates the mailbox for a new object: its public handle and the private
/// receiving end consumed by the object's worker.
pub(crate) fn channel(name: &str) -> (ObjectHandle, mpsc::UnboundedReceiver<Command>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ObjectHandle {
        id: ObjectId::next(),
        name: Arc::from(name),
        tx,
        sent: Arc::new(AtomicU64::new(0)),
    };
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let (a, _rx_a) = channel("a");
        let (b, _rx_b) = channel("b");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_send_bumps_sent_seqnum() {
        let (h, mut rx) = channel("target");
        assert_eq!(h.sent_seqnum(), 0);

        h.send_term(Linger::IMMEDIATE);
        h.send_term_ack();
        assert_eq!(h.sent_seqnum(), 2);

        assert!(matches!(rx.try_recv(), Ok(Command::Term { .. })));
        assert!(matches!(rx.try_recv(), Ok(Command::TermAck)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_fifo_per_sender_target_pair() {
        let (h, mut rx) = channel("target");
        h.send_plug(None);
        h.send_term(Linger::millis(5));

        assert!(matches!(rx.try_recv(), Ok(Command::Plug { owner: None })));
        assert!(matches!(rx.try_recv(), Ok(Command::Term { .. })));
    }

    #[test]
    fn test_mailbox_stays_open_while_any_handle_lives() {
        use tokio::sync::mpsc::error::TryRecvError;

        let (h, mut rx) = channel("t");
        let kept = h.clone();
        drop(h);

        // A live clone (the core's own handle, in practice) keeps the channel
        // open: the receiver reports empty, never disconnected.
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        drop(kept);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn test_request_stop_tolerates_destroyed_target() {
        let (h, rx) = channel("gone");
        drop(rx);
        assert!(!h.request_stop());
    }

    #[test]
    #[should_panic(expected = "destroyed object")]
    fn test_protocol_send_to_destroyed_target_aborts() {
        let (h, rx) = channel("gone");
        drop(rx);
        h.send_term_ack();
    }
}
