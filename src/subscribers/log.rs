//! # LogWriter — simple event printer.
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [plugged] object="root"
//! [ownership-taken] owner="root" child="session-1"
//! [term-started] object="root" linger_ms=500 cascaded=2
//! [ack-received] object="root" outstanding=1
//! [destroyed] object="session-1"
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::Plugged => {
                println!("[plugged] object={:?}", e.object);
            }
            EventKind::OwnershipTaken => {
                println!("[ownership-taken] owner={:?} child={:?}", e.object, e.peer);
            }
            EventKind::LateChildTerm => {
                println!("[late-child-term] owner={:?} child={:?}", e.object, e.peer);
            }
            EventKind::TermRequested => {
                println!("[term-requested] object={:?} owner={:?}", e.object, e.peer);
            }
            EventKind::TermStarted => {
                println!(
                    "[term-started] object={:?} linger_ms={:?} cascaded={:?}",
                    e.object, e.linger_ms, e.acks
                );
            }
            EventKind::AckReceived => {
                println!("[ack-received] object={:?} outstanding={:?}", e.object, e.acks);
            }
            EventKind::Destroyed => {
                println!("[destroyed] object={:?}", e.object);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.object, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.object.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
