//! # Command substrate: addressed, asynchronous, fire-and-forget delivery.
//!
//! This module is the seam between objects living on different workers.
//! Everything cross-thread in the crate flows through it:
//! - [`Command`] — the closed set of control messages;
//! - [`Linger`] — advisory shutdown patience carried on terminate commands;
//! - [`ObjectHandle`] / [`ObjectId`] — cloneable addresses with the atomic
//!   sent-seqnum accounting every delivery.
//!
//! ## Contract
//! - fire-and-forget, eventually delivered;
//! - FIFO per sender→target pair, nothing promised across senders;
//! - each delivered command is handled exactly once, on the target's worker.

mod command;
mod mailbox;

pub use command::{Command, Linger};
pub use mailbox::{ObjectHandle, ObjectId};

pub(crate) use mailbox::channel;
