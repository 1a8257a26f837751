//! # Observability events for the termination runtime.
//!
//! Object actors and the runtime publish [`Event`]s on the [`Bus`]; the
//! runtime's listener fans them out to user subscribers (see
//! [`subscribers`](crate::subscribers)). Events are observational only — no
//! coordination decision in the crate depends on them.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
