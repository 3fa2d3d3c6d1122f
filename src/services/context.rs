//! # Supervised context and the transient-error side channel.
//!
//! Every `run`/`initialize` call receives a [`ServiceContext`]. It carries:
//! - a [`CancellationToken`] (child of the supervisor's root token),
//! - a supervision handle: the service's id/name, the clock, the logger and
//!   the send side of the supervisor's status channel.
//!
//! The handle is what makes [`ServiceContext::report_transient_error`] work:
//!
//! ```text
//! service.run(ctx)
//!   └─► ctx.report_transient_error(Some(err))
//!         └─► StatusUpdate{TransientError} ──► status channel ──► supervisor loop
//!   └─► ctx.report_transient_error(None)
//!         └─► StatusUpdate{Running}        ──► status channel ──► supervisor loop
//! ```
//!
//! ## Rules
//! - Only the supervisor creates supervised contexts; a context built with
//!   [`ServiceContext::unsupervised`] reports `RuntimeError::NotSupervised`.
//! - The report blocks until the loop accepts it, unless the context is
//!   cancelled first (`RuntimeError::Canceled`).
//! - Every update is tagged with the launch it belongs to. The context is
//!   cancelled when its run cycle ends, and the loop drops anything a
//!   finished launch still manages to send.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::clock::ClockRef;
use crate::error::{RuntimeError, ServiceError};
use crate::logging::LoggerRef;
use crate::status::{Status, StatusUpdate};

/// A status update as it travels over the status channel.
#[derive(Debug)]
pub(crate) struct LaunchUpdate {
    /// Launch number of the run cycle that produced the update.
    pub(crate) launch: u64,
    pub(crate) update: StatusUpdate,
}

/// Binding between a running service and its supervisor.
#[derive(Clone)]
pub(crate) struct SupervisionHandle {
    id: usize,
    launch: u64,
    name: Arc<str>,
    clock: ClockRef,
    logger: LoggerRef,
    tx: mpsc::Sender<LaunchUpdate>,
}

impl SupervisionHandle {
    pub(crate) fn new(
        id: usize,
        launch: u64,
        name: Arc<str>,
        clock: ClockRef,
        logger: LoggerRef,
        tx: mpsc::Sender<LaunchUpdate>,
    ) -> Self {
        Self {
            id,
            launch,
            name,
            clock,
            logger,
            tx,
        }
    }

    /// Builds an update for the bound service, stamped with the clock's current time.
    fn update(&self, status: Status, error: Option<ServiceError>) -> LaunchUpdate {
        LaunchUpdate {
            launch: self.launch,
            update: StatusUpdate::new(self.id, Arc::clone(&self.name), self.clock.now(), status)
                .with_error(error),
        }
    }

    /// Sends a lifecycle update; waits for channel space and is not cancellable.
    pub(crate) async fn emit(&self, status: Status, error: Option<ServiceError>) {
        let update = self.update(status, error);
        if self.tx.send(update).await.is_err() {
            self.logger.debug(format_args!(
                "supervisor gone; dropped {status} update for service {}",
                self.name
            ));
        }
    }
}

/// Execution context handed to a supervised service.
///
/// Cheap to clone; clones share the same cancellation and supervision binding.
#[derive(Clone)]
pub struct ServiceContext {
    token: CancellationToken,
    handle: Option<SupervisionHandle>,
}

impl ServiceContext {
    /// Creates a context that is not bound to any supervisor.
    ///
    /// Useful for running a service directly (e.g. in tests); transient error
    /// reports from it fail with [`RuntimeError::NotSupervised`].
    pub fn unsupervised(token: CancellationToken) -> Self {
        Self {
            token,
            handle: None,
        }
    }

    pub(crate) fn supervised(token: CancellationToken, handle: SupervisionHandle) -> Self {
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Returns the cancellation token of this context.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns true once the supervisor is shutting down.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Returns the id of the bound service, if supervised.
    pub fn service_id(&self) -> Option<usize> {
        self.handle.as_ref().map(|h| h.id)
    }

    /// Returns the display name of the bound service, if supervised.
    pub fn service_name(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| &*h.name)
    }

    /// Returns the supervisor's logger, if supervised.
    pub fn logger(&self) -> Option<&LoggerRef> {
        self.handle.as_ref().map(|h| &h.logger)
    }

    /// Reports degraded (`Some(err)`) or recovered (`None`) health without stopping.
    ///
    /// `Some` yields a `TransientError` update, `None` a `Running` update.
    ///
    /// ### Errors
    /// - [`RuntimeError::NotSupervised`] if this context was not produced by a supervisor
    /// - [`RuntimeError::Canceled`] if the context is cancelled before the supervisor accepts the report
    /// - [`RuntimeError::Closed`] if the supervisor loop is gone
    pub async fn report_transient_error(
        &self,
        error: Option<ServiceError>,
    ) -> Result<(), RuntimeError> {
        let handle = self.handle.as_ref().ok_or(RuntimeError::NotSupervised)?;
        let status = if error.is_some() {
            Status::TransientError
        } else {
            Status::Running
        };
        let update = handle.update(status, error);

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(RuntimeError::Canceled),
            sent = handle.tx.send(update) => sent.map_err(|_| RuntimeError::Closed),
        }
    }
}

/// Free-function form of [`ServiceContext::report_transient_error`].
pub async fn report_transient_error(
    ctx: &ServiceContext,
    error: Option<ServiceError>,
) -> Result<(), RuntimeError> {
    ctx.report_transient_error(error).await
}
