use std::sync::Arc;

use crate::{
    clock::{ClockRef, SystemClock},
    core::config::SupervisorConfig,
    logging::{LoggerRef, NopLogger},
    services::ServiceRef,
    status::StatusUpdate,
};
use super::supervisor::{Listener, Supervisor};

/// Builder for constructing a Supervisor with optional collaborators.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    services: Vec<Option<ServiceRef>>,
    listeners: Vec<Listener>,
    clock: Option<ClockRef>,
    logger: Option<LoggerRef>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            services: Vec::new(),
            listeners: Vec::new(),
            clock: None,
            logger: None,
        }
    }

    /// Appends services in order; `None` entries are skipped and consume no id.
    pub fn with_services(mut self, services: impl IntoIterator<Item = Option<ServiceRef>>) -> Self {
        self.services.extend(services);
        self
    }

    /// Appends one service.
    pub fn with_service(mut self, service: ServiceRef) -> Self {
        self.services.push(Some(service));
        self
    }

    /// Registers a listener for health snapshots.
    ///
    /// Listeners are called synchronously from the event loop, in registration
    /// order, after every change of the health table. They must not block.
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&[StatusUpdate]) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Overrides the clock (defaults to [`SystemClock`]).
    pub fn with_clock(mut self, clock: ClockRef) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the logger (defaults to [`NopLogger`], i.e. no output).
    pub fn with_logger(mut self, logger: LoggerRef) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Builds the supervisor: resolves the registry and allocates the health table.
    ///
    /// Nothing is started until [`Supervisor::run`].
    pub fn build(self) -> Supervisor {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let logger = self.logger.unwrap_or_else(|| Arc::new(NopLogger));
        Supervisor::new_internal(self.cfg, self.services, self.listeners, clock, logger)
    }
}
