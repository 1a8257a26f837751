//! # Core: coordination state, workers, runtime.
//!
//! - [`ObjectCore`] — per-object ownership and termination state machine
//! - `actor` — the worker loop driving one object's mailbox
//! - [`Runtime`] / [`RuntimeBuilder`] — tree hosting and engine shutdown
//! - [`Config`] — linger, grace, bus capacity

pub(crate) mod actor;
mod builder;
mod config;
mod object;
pub(crate) mod runtime;

pub use builder::RuntimeBuilder;
pub use config::Config;
pub use object::ObjectCore;
pub use runtime::Runtime;
