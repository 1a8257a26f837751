//! # Event subscribers for the termination runtime.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   object actor ── publish(Event) ──► Bus ──► runtime listener ──► SubscriberSet
//!                                                                       │
//!                                                            ┌──────────┼──────────┐
//!                                                            ▼          ▼          ▼
//!                                                       AliveTracker LogWriter  custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** — observe and react to events (logging, metrics)
//! - **Stateful subscribers** — maintain internal state from events ([`AliveTracker`])

mod alive;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use alive::AliveTracker;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
