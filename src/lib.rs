//! # termvisor
//!
//! Ownership-tree lifecycle coordinator for concurrent engine objects:
//! asynchronous, non-blocking, convergence-based cascading termination.
//!
//! Objects form a tree of owners and children. Each object runs on its own
//! worker and is reached only through addressed commands; shutting a subtree
//! down is a protocol (terminate down, acknowledge up), not a blocking join.
//! An object is destroyed exactly when it is terminating, has no pending
//! acknowledgements, and has processed every command ever addressed to it.
//!
//! ## Architecture
//! ```text
//!                         ┌─────────┐  spawn_root
//!                         │ Runtime │──────────────┐
//!                         └────┬────┘              ▼
//!                              │ stop        ┌──────────┐ term(linger)
//!                              └───────────► │  root    │──────────────┐
//!                                            │ (actor)  │ ◄── term-ack │
//!                                            └────┬─────┘              ▼
//!                                          launch │              ┌──────────┐
//!                                                 └────────────► │ children │
//!                                                                └──────────┘
//!
//!     actors ── publish ──► Bus ──► listener ──► SubscriberSet ──► AliveTracker, ...
//! ```
//!
//! ## Core pieces
//! - [`Runtime`] / [`RuntimeBuilder`] — host the tree, drive engine shutdown
//! - [`Lifecycle`] — the hooks an object implements ([`Inert`] is the no-op leaf)
//! - [`ObjectCore`] — per-object coordination state, exposed to hooks
//! - [`ObjectHandle`] — cloneable address; [`ObjectHandle::request_stop`] is
//!   the external way to terminate an object
//! - [`Linger`] — advisory shutdown patience; [`Config::grace`] is the hard
//!   engine-level bound
//! - [`Bus`] / [`Event`] / [`Subscribe`] — observability fan-out
//!
//! ## Example
//! ```
//! use termvisor::{Config, Inert, Runtime, RuntimeError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), RuntimeError> {
//!     let mut rt = Runtime::builder(Config::default()).build();
//!     rt.spawn_root(Box::new(Inert::new("root")));
//!     rt.shutdown().await
//! }
//! ```

mod commands;
mod core;
mod error;
mod events;
mod objects;
mod subscribers;

pub use commands::{Command, Linger, ObjectHandle, ObjectId};
pub use core::{Config, ObjectCore, Runtime, RuntimeBuilder};
pub use error::RuntimeError;
pub use events::{Bus, Event, EventKind};
pub use objects::{Inert, Lifecycle};
pub use subscribers::{AliveTracker, Subscribe, SubscriberSet};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
