//! Logger boundary used by the supervisor for observability.
//!
//! The supervisor writes two severities: debug detail (every received update,
//! services still alive during drain) and warnings (restarts). Without a
//! configured logger it stays silent.
//!
//! ## Contents
//! - [`Logger`] the capability trait
//! - [`NopLogger`] default, discards everything
//! - [`TracingLogger`] forwards to the `tracing` facade
//!
//! Running services reach the same logger through
//! [`ServiceContext::logger`](crate::ServiceContext::logger).

mod nop;
mod trace;

use std::fmt;
use std::sync::Arc;

pub use nop::NopLogger;
pub use trace::TracingLogger;

/// Shared handle to a logger.
pub type LoggerRef = Arc<dyn Logger>;

/// Two-severity logging sink.
///
/// Call sites pass pre-built [`fmt::Arguments`], so implementations pay for
/// formatting only when they actually emit.
///
/// # Example
/// ```
/// use std::fmt;
/// use servicevisor::Logger;
///
/// struct Stderr;
///
/// impl Logger for Stderr {
///     fn debug(&self, args: fmt::Arguments<'_>) { eprintln!("DEBUG: {args}"); }
///     fn warning(&self, args: fmt::Arguments<'_>) { eprintln!("WARN: {args}"); }
/// }
///
/// Stderr.warning(format_args!("restarting service {}", "db"));
/// ```
pub trait Logger: Send + Sync + 'static {
    /// Detailed, high-volume diagnostics.
    fn debug(&self, args: fmt::Arguments<'_>);

    /// Noteworthy events such as restarts.
    fn warning(&self, args: fmt::Arguments<'_>);
}
