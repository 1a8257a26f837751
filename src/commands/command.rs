//! # Control commands and the linger value they carry.
//!
//! [`Command`] is the closed set of engine-internal control messages exchanged
//! between objects in the ownership tree. Commands are addressed, asynchronous
//! and fire-and-forget: the sender never waits for a reply, all coordination
//! state lives in the receiving object.
//!
//! ## Rules
//! - A command is processed exactly once, on the target's own worker.
//! - Delivery is FIFO per sender→target pair; no ordering across senders.
//! - Payload handles are identities, never borrowed state.
//!
//! [`Linger`] is the advisory shutdown patience forwarded on [`Command::Term`].
//! The coordinator itself never sleeps for it; lower transport layers may use
//! it to bound how long they keep draining buffered work.

use std::time::Duration;

use super::mailbox::ObjectHandle;

/// Advisory shutdown patience, in the engine's wire convention.
///
/// ## Sentinel values
/// - `-1` → wait indefinitely ([`Linger::INFINITE`])
/// - `0` → discard pending work immediately ([`Linger::IMMEDIATE`])
/// - `> 0` → bounded wait in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Linger(i32);

impl Linger {
    /// Wait indefinitely for pending work to drain.
    pub const INFINITE: Linger = Linger(-1);

    /// Discard pending work immediately.
    pub const IMMEDIATE: Linger = Linger(0);

    /// Bounded wait of `ms` milliseconds (saturating at `i32::MAX`).
    pub fn millis(ms: u32) -> Self {
        Linger(ms.min(i32::MAX as u32) as i32)
    }

    /// Builds a linger from the raw wire value; any negative value means infinite.
    pub fn from_raw(raw: i32) -> Self {
        if raw < 0 { Linger::INFINITE } else { Linger(raw) }
    }

    /// Raw wire value (`-1`, `0`, or positive milliseconds).
    #[inline]
    pub fn as_raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn is_infinite(self) -> bool {
        self.0 < 0
    }

    /// Bounded form of this linger.
    ///
    /// - `None` → infinite (no bound)
    /// - `Some(d)` → drain for at most `d` (zero = discard now)
    pub fn bound(self) -> Option<Duration> {
        if self.is_infinite() {
            None
        } else {
            Some(Duration::from_millis(self.0 as u64))
        }
    }
}

impl Default for Linger {
    /// Matches the engine default: wait indefinitely.
    fn default() -> Self {
        Linger::INFINITE
    }
}

/// Engine-internal control command.
///
/// Variants map one-to-one onto the substrate send operations exposed by
/// [`ObjectHandle`]; each is handled on the target's own worker by the object
/// actor.
#[derive(Debug)]
pub enum Command {
    /// First command an object ever receives: finish local setup on the own
    /// worker. Carries the owner edge (`None` for roots) so the back-reference
    /// is assigned by the object's own thread, exactly once.
    Plug { owner: Option<ObjectHandle> },

    /// Take ownership of a freshly launched child. Always self-addressed by
    /// the parent so the bookkeeping serializes with its termination state.
    Own { child: ObjectHandle },

    /// Terminate the target and its whole subtree. `linger` is the
    /// requester's patience, forwarded downstream.
    Term { linger: Linger },

    /// A child asks its owner to terminate it.
    TermReq { child: ObjectHandle },

    /// A terminated child confirms its destruction to its former owner.
    TermAck,

    /// External request to begin self-termination (delivered so the decision
    /// runs on the target's own worker).
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linger_sentinels() {
        assert!(Linger::INFINITE.is_infinite());
        assert_eq!(Linger::INFINITE.as_raw(), -1);
        assert_eq!(Linger::INFINITE.bound(), None);

        assert!(!Linger::IMMEDIATE.is_infinite());
        assert_eq!(Linger::IMMEDIATE.bound(), Some(Duration::ZERO));
    }

    #[test]
    fn test_linger_millis_saturates() {
        assert_eq!(Linger::millis(500).as_raw(), 500);
        assert_eq!(Linger::millis(u32::MAX).as_raw(), i32::MAX);
    }

    #[test]
    fn test_linger_from_raw_normalizes_negatives() {
        assert_eq!(Linger::from_raw(-7), Linger::INFINITE);
        assert_eq!(Linger::from_raw(0), Linger::IMMEDIATE);
        assert_eq!(Linger::from_raw(250).bound(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_default_is_infinite() {
        assert_eq!(Linger::default(), Linger::INFINITE);
    }
}
