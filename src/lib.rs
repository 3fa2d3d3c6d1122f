//! # servicevisor
//!
//! **Servicevisor** is a small process-lifecycle supervisor for long-lived
//! async services.
//!
//! It starts a fixed set of services, watches their health, relaunches the
//! ones that end (cleanly, with an error, or by panicking) on a fixed restart
//! interval, and publishes a full health snapshot to listeners after every
//! change. Cancelling the root token stops everything and waits until no
//! service is alive.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Service    │   │   Service    │   │   Service    │
//!     │  (id = 0)    │   │  (id = 1)    │   │  (id = 2)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (single-writer event loop)                            │
//! │  - Registry     (ids and names, fixed at construction)            │
//! │  - HealthTable  (latest StatusUpdate per id, owned by the loop)   │
//! │  - Ticker       (fixed restart interval, from the Clock)          │
//! │  - Listeners    (receive a copy of the table after each change)   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ service task │   │ service task │   │ service task │
//!     │ (one cycle)  │   │ (one cycle)  │   │ (one cycle)  │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Initializing     │ Running          │ TransientError
//!      │ Running          │ Stopped          │ Running
//!      │ Error            │                  │ Panic
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │              status channel (SupervisorConfig::channel_capacity)  │
//! └───────────────────────────────────┬───────────────────────────────┘
//!                                     ▼
//!                       table[service_id] = update
//!                                     ▼
//!                          listener(&snapshot) ...
//! ```
//!
//! ### Lifecycle of one run cycle
//! ```text
//! Idle ─► [Initializing ─►] Running ─┬─► Stopped          (run returned Ok)
//!                  │         ▲   │    ├─► Error            (run returned Err)
//!                  │         │   ▼    └─► Panic            (run panicked)
//!                  │      TransientError  (reported by the service itself)
//!                  └─► Error                               (initialize failed)
//!
//! Every restart tick relaunches services in Stopped, Error or Panic.
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                         |
//! |-----------------|----------------------------------------------------------|--------------------------------------------|
//! | **Services**    | Define services as types or closures.                    | [`Service`], [`Initialize`], [`ServiceFn`] |
//! | **Supervision** | Run, restart, drain and observe a set of services.       | [`Supervisor`], [`SupervisorBuilder`]      |
//! | **Health**      | Status model and snapshots handed to listeners.          | [`Status`], [`StatusUpdate`], [`Listener`] |
//! | **Time**        | Pluggable time source; a manual clock for tests.         | [`Clock`], [`SystemClock`], [`ManualClock`]|
//! | **Logging**     | Optional supervisor diagnostics.                         | [`Logger`], [`TracingLogger`]              |
//! | **Errors**      | Typed errors for services and runtime operations.        | [`ServiceError`], [`RuntimeError`]         |
//! | **Config**      | Restart interval and channel capacity.                   | [`SupervisorConfig`]                       |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{ServiceContext, ServiceError, ServiceFn, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let worker = ServiceFn::arc("worker", |ctx: ServiceContext| async move {
//!         ctx.cancelled().await;
//!         Ok::<(), ServiceError>(())
//!     });
//!
//!     let mut sup = Supervisor::builder(SupervisorConfig::with_restart_interval(Duration::from_secs(1)))
//!         .with_service(worker)
//!         .with_listener(|snapshot| {
//!             for update in snapshot {
//!                 println!("{update}");
//!             }
//!         })
//!         .build();
//!
//!     let token = CancellationToken::new();
//!     let stop = token.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         stop.cancel();
//!     });
//!
//!     sup.run(token).await?;
//!     Ok(())
//! }
//! ```
mod clock;
mod core;
mod error;
mod logging;
mod services;
mod status;

// ---- Public re-exports ----

pub use clock::{Clock, ClockRef, ManualClock, SystemClock, Ticker};
pub use core::{Listener, ServiceInfo, Supervisor, SupervisorBuilder, SupervisorConfig};
pub use error::{RuntimeError, ServiceError};
pub use logging::{Logger, LoggerRef, NopLogger, TracingLogger};
pub use services::{
    InitServiceFn, Initialize, Service, ServiceContext, ServiceFn, ServiceRef,
    report_transient_error,
};
pub use status::{Status, StatusUpdate};
