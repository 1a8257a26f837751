//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the termination runtime.
//!
//! Config is read in two places:
//! 1. **Object creation**: every spawned object captures `linger` and reads
//!    it once when it begins its own termination.
//! 2. **Runtime shutdown**: `grace` bounds how long [`Runtime::shutdown`]
//!    waits for the whole tree to converge.
//!
//! [`Runtime::shutdown`]: crate::Runtime::shutdown

use std::time::Duration;

use crate::commands::Linger;

/// Global configuration for the termination runtime.
///
/// ## Field semantics
/// - `linger`: advisory shutdown patience forwarded on terminate commands
///   (`-1` = infinite, `0` = discard now, `>0` = bounded ms)
/// - `grace`: hard bound on engine-level shutdown — unlike `linger` this one
///   is enforced by the runtime, not forwarded downstream
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
#[derive(Clone, Debug)]
pub struct Config {
    /// Advisory patience carried on terminate commands.
    ///
    /// Read once per object when it begins its own termination; the
    /// requester's linger governs cascades, so a parent's patience is what a
    /// child receives.
    pub linger: Linger,

    /// Maximum time [`Runtime::shutdown`](crate::Runtime::shutdown) waits for
    /// the tree to drain before force-cancelling remaining actors and
    /// returning [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded).
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// skip older items. Minimum value is 1 (enforced by the Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `linger = infinite` (the engine default: never discard pending work)
    /// - `grace = 60s` (reasonable engine teardown window)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            linger: Linger::INFINITE,
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}
