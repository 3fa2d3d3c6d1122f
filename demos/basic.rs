//! # Example: basic
//!
//! Supervises two services until Ctrl-C:
//! - `ticker` runs until shutdown and reports a transient error every third beat;
//! - `crasher` fails shortly after every launch and is relaunched on each restart tick.
//!
//! Every health snapshot is printed by a listener; supervisor diagnostics go
//! through [`TracingLogger`].
//!
//! ## Flow
//! ```text
//! Supervisor::run_until_signal()
//!     ├─► launch ticker, crasher       (Idle ─► Running)
//!     ├─► crasher returns Err          (Error)
//!     ├─► restart tick (500ms)         (Idle ─► Running ─► Error ...)
//!     ├─► ticker reports degraded      (TransientError ─► Running)
//!     └─► Ctrl-C ─► cancel, drain      (Stopped, Error)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=servicevisor=debug cargo run --example basic
//! ```

use std::sync::Arc;
use std::time::Duration;

use servicevisor::{
    ServiceContext, ServiceError, ServiceFn, ServiceRef, Supervisor, SupervisorConfig,
    TracingLogger,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let ticker: ServiceRef = ServiceFn::arc("ticker", |ctx: ServiceContext| async move {
        let mut beat = 0u32;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok::<(), ServiceError>(()),
                _ = tokio::time::sleep(Duration::from_millis(300)) => {}
            }
            beat += 1;
            let health = (beat % 3 == 0).then(|| ServiceError::fail(format!("beat {beat} was late")));
            if ctx.report_transient_error(health).await.is_err() {
                return Ok(());
            }
        }
    });

    let crasher: ServiceRef = ServiceFn::arc("crasher", |ctx: ServiceContext| async move {
        tokio::select! {
            _ = ctx.cancelled() => Err::<(), _>(ServiceError::Canceled),
            _ = tokio::time::sleep(Duration::from_millis(200)) => Err(ServiceError::fail("timeout")),
        }
    });

    let cfg = SupervisorConfig::with_restart_interval(Duration::from_millis(500));
    let mut sup = Supervisor::builder(cfg)
        .with_services([Some(ticker), Some(crasher)])
        .with_logger(Arc::new(TracingLogger::new()))
        .with_listener(|snapshot| {
            let line: Vec<String> = snapshot
                .iter()
                .map(|u| format!("{}: {}", u.service_name, u.status))
                .collect();
            println!("{}", line.join(" | "));
        })
        .build();

    sup.run_until_signal().await?;
    println!("all services stopped");
    Ok(())
}
