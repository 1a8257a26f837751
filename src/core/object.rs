//! # Object core — ownership edges, termination cascade, convergence.
//!
//! [`ObjectCore`] is the coordination state every engine object carries: the
//! set-once owner edge, the strongly-owned children, the in-flight command
//! accounting (sent/processed seqnums) and the pending-acknowledgement
//! counter that together decide when the object may be destroyed.
//!
//! ## Architecture
//! ```text
//!                    owner (weak, set once)
//!                          ▲
//!                          │ term-req / term-ack
//!                          │
//!                    ┌─────┴──────┐   term(linger)   ┌────────────┐
//!                    │ ObjectCore │ ───────────────► │  children  │
//!                    │  (1 worker)│ ◄─────────────── │ (strong set)│
//!                    └────────────┘     term-ack     └────────────┘
//!
//! destroy ⇔ terminating ∧ processed == sent (atomic) ∧ pending_acks == 0
//! ```
//!
//! ## Rules
//! - Every non-atomic field is mutated only by the object's own worker; the
//!   sent seqnum in the handle is the sole cross-thread counter.
//! - A child is present in exactly one parent's set and is removed exactly
//!   once, before the terminate command is sent to it.
//! - Termination is not cancellable and never re-entered: a second
//!   [`begin_terminate`](ObjectCore::begin_terminate) is a fatal assertion.
//! - Waiting is never a blocked thread; it is outstanding acks plus seqnum
//!   deltas resolved by future command deliveries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::{Linger, ObjectHandle, ObjectId};
use crate::core::runtime::Spawner;
use crate::events::{Bus, Event, EventKind};
use crate::objects::Lifecycle;

/// Coordination state of one object in the ownership tree.
///
/// Hooks receive `&mut ObjectCore` and use it to grow the tree
/// ([`launch`](ObjectCore::launch)) or shrink it
/// ([`terminate`](ObjectCore::terminate)); everything else on it is driven by
/// the object's worker as commands arrive.
pub struct ObjectCore {
    /// This object's own address (also holds the atomic sent seqnum).
    handle: ObjectHandle,
    /// Weak back-reference to the owner; assigned exactly once at plug time.
    owner: Option<ObjectHandle>,
    /// Strongly owned children, keyed by identity. Iteration order is
    /// deliberately unspecified; siblings terminate in no particular order.
    children: HashMap<ObjectId, ObjectHandle>,
    /// Commands this worker has finished processing.
    processed_seqnum: u64,
    /// Outstanding child-termination acknowledgements.
    pending_acks: u32,
    /// Set when this object begins its own termination; never resets.
    terminating: bool,
    /// Set when a termination request was already sent to the owner; makes
    /// repeated [`terminate`](ObjectCore::terminate) calls send at most one.
    term_requested: bool,
    /// Set exactly once, by the successful convergence check.
    destroyed: bool,
    /// This object's configured shutdown patience.
    linger: Linger,
    bus: Bus,
    spawner: Spawner,
}

impl ObjectCore {
    pub(crate) fn new(handle: ObjectHandle, linger: Linger, bus: Bus, spawner: Spawner) -> Self {
        Self {
            handle,
            owner: None,
            children: HashMap::new(),
            processed_seqnum: 0,
            pending_acks: 0,
            terminating: false,
            term_requested: false,
            destroyed: false,
            linger,
            bus,
            spawner,
        }
    }

    /// This object's address; cloneable, safe to hand to other threads.
    #[inline]
    pub fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    #[inline]
    pub fn name(&self) -> &Arc<str> {
        self.handle.name()
    }

    /// This object's configured shutdown patience.
    #[inline]
    pub fn linger(&self) -> Linger {
        self.linger
    }

    #[inline]
    pub fn is_terminating(&self) -> bool {
        self.terminating
    }

    #[inline]
    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// Number of currently owned children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Spawns `lifecycle` as a new object and links it under this one.
    ///
    /// Two independent commands do the linking: a plug to the child (so it
    /// finishes its own setup on its own worker, owner edge included) and a
    /// self-addressed take-ownership command (so the parent's bookkeeping
    /// serializes with its termination state). The split avoids any race
    /// between child setup and parent registration.
    ///
    /// Launching while terminating is allowed; the take-ownership command
    /// will take the late-child path and terminate the newcomer immediately.
    pub fn launch(&mut self, lifecycle: Box<dyn Lifecycle>) -> ObjectHandle {
        let child = self.spawner.spawn(lifecycle);
        child.send_plug(Some(self.handle.clone()));
        self.handle.send_own(child.clone());
        child
    }

    /// Owner edge assignment, from the plug command. Set-once.
    pub(crate) fn set_owner(&mut self, owner: ObjectHandle) {
        assert!(
            self.owner.is_none(),
            "owner already assigned on `{}`",
            self.name()
        );
        self.owner = Some(owner);
    }

    /// Registers a launched child, or terminates it immediately if this
    /// object already started shutting down (fast-shutdown race).
    pub(crate) fn on_take_ownership(&mut self, child: ObjectHandle) {
        if self.terminating {
            // Too late to join the tree: expect one ack and send the child an
            // immediate terminate.
            self.register_pending_acks(1);
            child.send_term(Linger::IMMEDIATE);
            self.bus.publish(
                Event::new(EventKind::LateChildTerm)
                    .with_object(self.name().clone())
                    .with_peer(child.name().clone()),
            );
            return;
        }

        self.bus.publish(
            Event::new(EventKind::OwnershipTaken)
                .with_object(self.name().clone())
                .with_peer(child.name().clone()),
        );
        self.children.insert(child.id(), child);
    }

    /// Handles a child's request to be terminated. Idempotent.
    ///
    /// - already terminating → the cascade covers (or covered) the child;
    /// - child absent → a duplicate request, silently ignored;
    /// - otherwise remove the child, expect one ack, and send it a terminate
    ///   carrying **this object's** linger — the requester's patience
    ///   governs, not the child's.
    pub(crate) fn request_child_termination(&mut self, child: &ObjectHandle) {
        if self.terminating {
            return;
        }
        let Some(child) = self.children.remove(&child.id()) else {
            return;
        };
        self.register_pending_acks(1);
        child.send_term(self.linger);
    }

    /// Requests termination of this object. Idempotent.
    ///
    /// With an owner, the request travels up: the owner removes this object
    /// from its set and sends the terminate back down. Without one (a root)
    /// the cascade begins immediately, with this object's own linger.
    pub fn terminate(&mut self) {
        if self.terminating || self.term_requested {
            return;
        }

        match self.owner.clone() {
            None => self.begin_terminate(self.linger),
            Some(owner) => {
                self.term_requested = true;
                owner.send_term_req(self.handle.clone());
                self.bus.publish(
                    Event::new(EventKind::TermRequested)
                        .with_object(self.name().clone())
                        .with_peer(owner.name().clone()),
                );
            }
        }
    }

    /// Starts this object's own termination: cascade to every current child,
    /// expect one ack per child, clear the set, flip `terminating`.
    ///
    /// The received `linger` is forwarded unchanged to the children. Calling
    /// this twice is a structural invariant break and aborts.
    pub(crate) fn begin_terminate(&mut self, linger: Linger) {
        assert!(
            !self.terminating,
            "termination re-entered on `{}`",
            self.name()
        );

        for child in self.children.values() {
            child.send_term(linger);
        }
        let cascaded = self.children.len() as u32;
        self.register_pending_acks(cascaded);
        self.children.clear();
        self.terminating = true;

        self.bus.publish(
            Event::new(EventKind::TermStarted)
                .with_object(self.name().clone())
                .with_linger(linger)
                .with_acks(cascaded),
        );
        self.check_convergence();
    }

    /// Expects `n` more termination acknowledgements.
    pub(crate) fn register_pending_acks(&mut self, n: u32) {
        self.pending_acks += n;
    }

    /// One child confirmed its destruction.
    ///
    /// An ack with none outstanding is a fatal contract violation.
    pub(crate) fn on_ack_received(&mut self) {
        assert!(
            self.pending_acks > 0,
            "termination ack with none outstanding on `{}`",
            self.name()
        );
        self.pending_acks -= 1;

        self.bus.publish(
            Event::new(EventKind::AckReceived)
                .with_object(self.name().clone())
                .with_acks(self.pending_acks),
        );
        self.check_convergence();
    }

    /// Called by the worker after it finishes one addressed command.
    ///
    /// Returns `true` when the object converged and must now be destroyed;
    /// the worker runs the destruction hook and exits.
    pub(crate) fn note_command_processed(&mut self) -> bool {
        self.processed_seqnum += 1;
        self.check_convergence()
    }

    /// Destroy iff terminating, no command in flight (processed equals the
    /// atomically read sent seqnum) and no ack outstanding. On success sends
    /// exactly one ack to the owner, once, ever.
    fn check_convergence(&mut self) -> bool {
        if self.destroyed {
            return true;
        }
        if !self.terminating
            || self.pending_acks != 0
            || self.processed_seqnum != self.handle.sent_seqnum()
        {
            return false;
        }

        assert!(
            self.children.is_empty(),
            "object `{}` converged with children still owned",
            self.name()
        );
        if let Some(owner) = &self.owner {
            owner.send_term_ack();
        }
        self.destroyed = true;
        true
    }

    #[cfg(test)]
    pub(crate) fn pending_acks(&self) -> u32 {
        self.pending_acks
    }
}
