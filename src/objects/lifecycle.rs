//! # Lifecycle hooks for coordinated objects.
//!
//! [`Lifecycle`] is the extension point an engine object implements to
//! participate in the ownership tree. The coordination itself (ownership
//! edges, seqnums, acks, convergence) lives in
//! [`ObjectCore`](crate::core::ObjectCore); the hooks are where the object
//! does its domain work: open resources on plug, drain lower layers on
//! terminate, release resources on destroy.
//!
//! Every hook runs on the object's own worker, one command at a time — no
//! synchronization is needed inside an implementation.

use async_trait::async_trait;

use crate::commands::Linger;
use crate::core::ObjectCore;

/// # Hooks invoked by an object's own worker.
///
/// All hooks have no-op defaults; a plain tree node only needs [`name`](Lifecycle::name).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use termvisor::{Lifecycle, Linger, ObjectCore};
///
/// struct Session;
///
/// #[async_trait]
/// impl Lifecycle for Session {
///     fn name(&self) -> &str { "session" }
///
///     async fn on_plug(&mut self, core: &mut ObjectCore) {
///         // open the connection, launch engine children via core.launch(...)
///         let _ = core;
///     }
///
///     async fn on_term(&mut self, _core: &mut ObjectCore, linger: Linger) {
///         // stop accepting work; honor `linger` while draining buffers
///         let _ = linger;
///     }
/// }
/// ```
#[async_trait]
pub trait Lifecycle: Send + 'static {
    /// Stable, human-readable object name (for events and stuck-object reports).
    fn name(&self) -> &str;

    /// Local setup, after the object has been attached to the tree.
    ///
    /// This is the place to launch children: `core.launch(...)`.
    async fn on_plug(&mut self, core: &mut ObjectCore) {
        let _ = core;
    }

    /// Termination is starting for this object.
    ///
    /// Runs before the cascade to children. `linger` is the requester's
    /// advisory patience; implementations that buffer work should bound their
    /// draining by it. The coordinator itself never waits for it.
    async fn on_term(&mut self, core: &mut ObjectCore, linger: Linger) {
        let _ = (core, linger);
    }

    /// Physical-destruction hook, invoked exactly once after convergence
    /// (all children acknowledged, all in-flight commands drained).
    ///
    /// The default destroys the object immediately; an implementation may
    /// delay physical teardown by awaiting here.
    async fn on_destroy(&mut self) {}
}

/// A leaf object with no behavior of its own.
///
/// Useful as a plain container node in the tree and in tests.
pub struct Inert {
    name: String,
}

impl Inert {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Lifecycle for Inert {
    fn name(&self) -> &str {
        &self.name
    }
}
