//! # Object actor — one worker per object.
//!
//! [`ObjectActor`] owns the receiving end of an object's mailbox and is the
//! only code that touches its [`ObjectCore`] and [`Lifecycle`] after spawn.
//! It processes commands strictly one at a time, bumps the processed seqnum
//! after each, and exits once the core reports convergence.
//!
//! ## Rules
//! - No locking: single-consumer mailbox gives the thread-affinity guarantee.
//! - Hooks run inline on the worker; a hook that never returns stalls only
//!   this object (and whatever waits on its ack), never the runtime thread.
//! - The force token is an engine-level escape hatch: when the shutdown grace
//!   runs out the runtime cancels it and stalled workers are abandoned at the
//!   next await point in the loop.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::commands::Command;
use crate::core::ObjectCore;
use crate::events::{Event, EventKind};
use crate::objects::Lifecycle;

/// Worker task driving one object's mailbox.
pub(crate) struct ObjectActor {
    core: ObjectCore,
    lifecycle: Box<dyn Lifecycle>,
    rx: mpsc::UnboundedReceiver<Command>,
    force: CancellationToken,
    /// Held for presence only: the runtime's shutdown observes the channel
    /// closing once every actor has exited.
    _presence: mpsc::Sender<()>,
}

impl ObjectActor {
    pub(crate) fn new(
        core: ObjectCore,
        lifecycle: Box<dyn Lifecycle>,
        rx: mpsc::UnboundedReceiver<Command>,
        force: CancellationToken,
        presence: mpsc::Sender<()>,
    ) -> Self {
        Self {
            core,
            lifecycle,
            rx,
            force,
            _presence: presence,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            let cmd = tokio::select! {
                _ = self.force.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => cmd,
                    // Unreachable: the core holds this object's own handle,
                    // which keeps a sender alive for the actor's lifetime.
                    // Kept as a plain loop exit rather than a panic path.
                    None => break,
                },
            };

            dispatch(&mut self.core, self.lifecycle.as_mut(), cmd).await;
            if self.core.note_command_processed() {
                self.lifecycle.on_destroy().await;
                self.core.bus().publish(
                    Event::new(EventKind::Destroyed).with_object(self.core.name().clone()),
                );
                break;
            }
        }
    }
}

/// Applies one command to an object. Runs on the object's own worker.
pub(crate) async fn dispatch(core: &mut ObjectCore, lifecycle: &mut dyn Lifecycle, cmd: Command) {
    match cmd {
        Command::Plug { owner } => {
            if let Some(owner) = owner {
                core.set_owner(owner);
            }
            lifecycle.on_plug(core).await;
            core.bus()
                .publish(Event::new(EventKind::Plugged).with_object(core.name().clone()));
        }
        Command::Own { child } => core.on_take_ownership(child),
        Command::Term { linger } => {
            // Domain draining first, then the cascade; an object receives at
            // most one terminate, so the hook runs at most once.
            lifecycle.on_term(core, linger).await;
            core.begin_terminate(linger);
        }
        Command::TermReq { child } => core.request_child_termination(&child),
        Command::TermAck => core.on_ack_received(),
        Command::Stop => {
            // A root's cascade starts right here, so its draining hook must
            // run first; a child's hook runs when the owner's terminate
            // arrives.
            if !core.is_terminating() && !core.has_owner() {
                let linger = core.linger();
                lifecycle.on_term(core, linger).await;
            }
            core.terminate();
        }
    }
}
