//! Error types used by the servicevisor runtime and services.
//!
//! This module defines two main error enums:
//!
//! - [`ServiceError`]: errors returned by (or synthesized for) supervised services.
//! - [`RuntimeError`]: usage errors raised to callers of the runtime itself.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Service errors never fail the supervisor: they are folded into
//! [`StatusUpdate`](crate::StatusUpdate)s and drive the restart policy.
//! Runtime errors are returned directly to the caller.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by supervised services.
///
/// The supervisor treats every variant the same way: the service's current run
/// cycle is over and it will be relaunched on the next restart tick.
///
/// `ServiceError` is [`Clone`] so it can live inside the health snapshots handed
/// to listeners.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Service-reported failure.
    #[error("service failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Contained fault: the service panicked and the panic was trapped at the task boundary.
    #[error("service panicked: {message}{}", backtrace_suffix(.backtrace))]
    Panic {
        /// The panic payload rendered as text.
        message: String,
        /// Backtrace captured at the containment boundary; `None` unless enabled
        /// through `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`.
        backtrace: Option<String>,
    },

    /// Service gave up because its context was cancelled.
    #[error("context cancelled")]
    Canceled,
}

impl ServiceError {
    /// Creates a [`ServiceError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use servicevisor::ServiceError;
    ///
    /// let err = ServiceError::fail("connection refused");
    /// assert_eq!(err.to_string(), "service failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        ServiceError::Fail {
            error: error.to_string(),
        }
    }

    /// Synthesizes a [`ServiceError::Panic`] from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        ServiceError::Panic {
            message,
            backtrace: captured_backtrace(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servicevisor::ServiceError;
    ///
    /// assert_eq!(ServiceError::fail("boom").as_label(), "service_failed");
    /// assert_eq!(ServiceError::Canceled.as_label(), "service_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Fail { .. } => "service_failed",
            ServiceError::Panic { .. } => "service_panic",
            ServiceError::Canceled => "service_canceled",
        }
    }

    /// Returns a human-readable one-line message (backtrace omitted).
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Fail { error } => format!("error: {error}"),
            ServiceError::Panic { message, .. } => format!("panic: {message}"),
            ServiceError::Canceled => "context cancelled".to_string(),
        }
    }
}

impl From<String> for ServiceError {
    fn from(error: String) -> Self {
        ServiceError::Fail { error }
    }
}

impl From<&str> for ServiceError {
    fn from(error: &str) -> Self {
        ServiceError::fail(error)
    }
}

/// # Errors produced by the servicevisor runtime.
///
/// These are usage errors returned straight to the caller; they never appear
/// in status updates.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A transient error was reported from a context not produced by the supervisor.
    #[error("not a supervised context")]
    NotSupervised,

    /// The caller's context was cancelled before the supervisor received the report.
    #[error("context cancelled")]
    Canceled,

    /// The supervisor event loop is no longer running.
    #[error("supervisor closed")]
    Closed,

    /// Installing the OS shutdown signal handlers failed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servicevisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NotSupervised.as_label(), "runtime_not_supervised");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NotSupervised => "runtime_not_supervised",
            RuntimeError::Canceled => "runtime_canceled",
            RuntimeError::Closed => "runtime_closed",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NotSupervised => "not a supervised context".to_string(),
            RuntimeError::Canceled => "context cancelled".to_string(),
            RuntimeError::Closed => "supervisor closed".to_string(),
            RuntimeError::Signal(e) => format!("signal registration: {e}"),
        }
    }
}

fn captured_backtrace() -> Option<String> {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

fn backtrace_suffix(backtrace: &Option<String>) -> String {
    backtrace
        .as_deref()
        .map(|trace| format!("\n{trace}"))
        .unwrap_or_default()
}
