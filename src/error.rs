//! Error types surfaced by the termination runtime.
//!
//! Only genuine runtime failures are represented here. Structural contract
//! violations — re-entering termination, an acknowledgement arriving with
//! none outstanding, a command addressed to a destroyed object — are
//! programmer errors with no retry path and abort via `panic!`/`assert!`
//! instead of flowing through a `Result`.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the termination runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; part of the ownership tree never
    /// converged (an object stuck in a hook, or an ack that never arrived
    /// from a misbehaving lower layer).
    #[error("shutdown grace {grace:?} exceeded; still alive: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of objects that were still alive when the grace ran out.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use termvisor::RuntimeError;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck objects={stuck:?}")
            }
        }
    }
}
