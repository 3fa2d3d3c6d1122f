//! # Supervisor: single-writer event loop over the health table.
//!
//! The [`Supervisor`] owns the registry, the health table and the listeners.
//! It launches every service as its own tokio task and funnels every
//! transition from every task through one status channel that only the loop
//! reads. The loop is the only writer of the health table, so the table needs
//! no lock.
//!
//! ## High-level architecture
//! ```text
//! run(token):
//!   ticker = clock.new_ticker(restart_interval)
//!   for each service: launch()  ── Idle written synchronously, task spawned
//!   notify_listeners()
//!
//!   ServiceTask #0 ──┐
//!   ServiceTask #1 ──┼── LaunchUpdate ──► [status channel] ──► event loop
//!   ServiceTask #N ──┘        ▲                                   │
//!        (report_transient_error)                                 ▼
//!                                                       HealthTable[service_id]
//!                                                                 │
//!                                                                 ▼
//!                                               listener(&snapshot) (in order)
//!
//! event loop (first ready wins):
//!   ├─ ticker.tick()      → relaunch every non-alive service, notify after each
//!   ├─ channel.recv()     → table[id] = update, notify
//!   └─ token.cancelled()  → ticker.stop(), drain, return Ok(())
//!
//! drain:
//!   while any service alive: table[id] = channel.recv(), notify
//! ```
//!
//! Every launch gets a fresh launch number. Updates from an earlier launch, or
//! from a launch that already reported its terminal status, are dropped, so a
//! finished run cycle can never make its service look alive again.
//!
//! ## Rules
//! - No relaunch happens once cancellation has been observed.
//! - `run` returns only when no service is alive, so no service task outlives it.
//! - `run` returns `Ok(())` even when services ended in `Error`/`Panic`;
//!   observe those through a listener.
//! - Listeners run synchronously on the loop; a blocking listener stalls supervision.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::clock::ClockRef;
use crate::core::{
    builder::SupervisorBuilder,
    config::SupervisorConfig,
    health::HealthTable,
    launcher,
    registry::{Registry, ServiceInfo},
    shutdown::ShutdownSignal,
};
use crate::error::RuntimeError;
use crate::logging::LoggerRef;
use crate::services::{LaunchUpdate, ServiceRef, SupervisionHandle};
use crate::status::{Status, StatusUpdate};

/// Callback receiving a full health snapshot (one entry per service, ordered by id).
pub type Listener = Box<dyn Fn(&[StatusUpdate]) + Send + Sync>;

/// Runs a fixed set of services, restarts the ones that end, and publishes health snapshots.
pub struct Supervisor {
    cfg: SupervisorConfig,
    registry: Registry,
    health: HealthTable,
    listeners: Vec<Listener>,
    clock: ClockRef,
    logger: LoggerRef,
}

impl Supervisor {
    /// Creates a supervisor for `services` with the default clock and no logger.
    ///
    /// `None` entries are skipped and consume no id.
    pub fn new(cfg: SupervisorConfig, services: Vec<Option<ServiceRef>>) -> Self {
        SupervisorBuilder::new(cfg).with_services(services).build()
    }

    /// Returns a builder for wiring listeners, a clock or a logger.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        services: Vec<Option<ServiceRef>>,
        listeners: Vec<Listener>,
        clock: ClockRef,
        logger: LoggerRef,
    ) -> Self {
        let registry = Registry::new(services);
        let health = HealthTable::new(registry.len());
        Self {
            cfg,
            registry,
            health,
            listeners,
            clock,
            logger,
        }
    }

    /// Number of supervised services.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if no service is supervised.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Identity of every supervised service, ordered by id.
    pub fn services(&self) -> Vec<ServiceInfo> {
        self.registry.infos()
    }

    /// Launches all services and supervises them until `token` is cancelled.
    ///
    /// Returns only after every service has reached a non-alive status.
    /// Always returns `Ok(())`; individual service failures are reported to
    /// listeners only.
    pub async fn run(&mut self, token: CancellationToken) -> Result<(), RuntimeError> {
        let (tx, mut rx) = mpsc::channel(self.cfg.channel_capacity_clamped());
        let mut ticker = self.clock.new_ticker(self.cfg.restart_interval_clamped());

        for id in 0..self.registry.len() {
            self.launch(id, &token, &tx);
        }
        self.notify_listeners();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.restart_terminated(&token, &tx),
                Some(update) = rx.recv() => self.handle_update(update),
                _ = token.cancelled() => break,
            }
        }

        ticker.stop();
        self.drain(&mut rx).await;
        Ok(())
    }

    /// Like [`run`](Self::run), cancelled by SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere).
    pub async fn run_until_signal(&mut self) -> Result<(), RuntimeError> {
        let mut signal = ShutdownSignal::new()?;
        let token = CancellationToken::new();

        let trigger = token.clone();
        let logger = Arc::clone(&self.logger);
        let watcher = tokio::spawn(async move {
            signal.recv().await;
            logger.warning(format_args!("shutdown signal received"));
            trigger.cancel();
        });

        let res = self.run(token).await;
        watcher.abort();
        res
    }

    /// Writes `Idle` for service `id` and spawns its run cycle.
    fn launch(&mut self, id: usize, token: &CancellationToken, tx: &mpsc::Sender<LaunchUpdate>) {
        let Some(svc) = self.registry.get(id).map(Arc::clone) else {
            return;
        };
        let idle = StatusUpdate::new(svc.id, Arc::clone(&svc.name), self.clock.now(), Status::Idle);
        let Some(launch) = self.health.begin_launch(idle) else {
            return;
        };

        let handle = SupervisionHandle::new(
            svc.id,
            launch,
            Arc::clone(&svc.name),
            Arc::clone(&self.clock),
            Arc::clone(&self.logger),
            tx.clone(),
        );
        tokio::spawn(launcher::run_supervised(svc, handle, token.child_token()));
    }

    /// Relaunches every service whose run cycle has ended.
    fn restart_terminated(&mut self, token: &CancellationToken, tx: &mpsc::Sender<LaunchUpdate>) {
        if token.is_cancelled() {
            return;
        }
        for id in self.health.terminated() {
            if let Some(prev) = self.health.get(id) {
                self.logger.warning(format_args!(
                    "restarting service {}: {}",
                    prev.service_name, prev
                ));
            }
            self.launch(id, token, tx);
            self.notify_listeners();
        }
    }

    fn handle_update(&mut self, LaunchUpdate { launch, update }: LaunchUpdate) {
        if !self.health.accepts(update.service_id, launch) {
            self.logger.debug(format_args!(
                "dropped update from finished launch {launch}: {update}"
            ));
            return;
        }
        self.logger.debug(format_args!("received update: {update}"));
        if self.health.set(update) {
            self.notify_listeners();
        }
    }

    /// Folds updates into the table until no service is alive.
    async fn drain(&mut self, rx: &mut mpsc::Receiver<LaunchUpdate>) {
        while self.health.any_alive() {
            for update in self.health.alive() {
                self.logger.debug(format_args!("service alive: {update}"));
            }
            match rx.recv().await {
                Some(update) => self.handle_update(update),
                None => break,
            }
        }
    }

    /// Hands a copy of the full table to every listener, in registration order.
    fn notify_listeners(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.health.snapshot();
        for listener in &self.listeners {
            listener(&snapshot);
        }
    }
}
