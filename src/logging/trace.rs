//! # `tracing` backed logger
//!
//! Emits supervisor diagnostics as `tracing` events under the `servicevisor`
//! target, so any installed subscriber (e.g. `tracing_subscriber::fmt`) picks
//! them up and filters them with the usual directives:
//!
//! ```text
//! RUST_LOG=servicevisor=debug
//! ```

use std::fmt;

use super::Logger;

/// [`Logger`] forwarding to `tracing::debug!` / `tracing::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Construct a new [`TracingLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "servicevisor", "{}", args);
    }

    fn warning(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "servicevisor", "{}", args);
    }
}
