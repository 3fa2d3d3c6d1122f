//! # Shutdown signal for the signal-driven entry point.
//!
//! [`ShutdownSignal`] is used by
//! [`Supervisor::run_until_signal`](crate::Supervisor::run_until_signal): the
//! first signal cancels the root token, after which the supervisor drains.
//!
//! Handled signals: `SIGINT`, `SIGTERM` and `SIGQUIT` on unix, Ctrl-C elsewhere.

/// Registered termination signal listeners.
///
/// Listeners are installed eagerly by [`ShutdownSignal::new`] so registration
/// errors surface before the supervisor starts.
#[cfg(unix)]
pub(crate) struct ShutdownSignal {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    pub(crate) fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Completes when any of the signals arrives.
    pub(crate) async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }
}

/// Registered termination signal listeners.
#[cfg(not(unix))]
pub(crate) struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    pub(crate) fn new() -> std::io::Result<Self> {
        Ok(Self)
    }

    /// Completes on Ctrl-C; never completes if the handler cannot be installed.
    pub(crate) async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
