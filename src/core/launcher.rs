//! # Launch sequence of one service run cycle.
//!
//! Runs inside the task spawned by the supervisor for each (re)launch and
//! reports every transition to the event loop through the status channel.
//!
//! ## Event flow
//!
//! ```text
//! (Idle is written by the supervisor before the task is spawned)
//!
//! with Initialize:  Initializing → initialize() ─ Err ─► Error   (cycle ends)
//!                                               └ Ok ──┐
//! without:          ───────────────────────────────────┴► Running → run()
//!                                                                    ├ Ok  ─► Stopped
//!                                                                    └ Err ─► Error
//! panic anywhere above ───────────────────────────────────────────────────► Panic
//! ```
//!
//! ## Rules
//! - Always emits **exactly one** terminal update: `Stopped`, `Error` or `Panic`
//! - Panics are caught at the task boundary and never reach the supervisor
//! - Lifecycle sends are not cancellable; the loop drains them during shutdown
//! - The launch token is cancelled once the terminal update is sent, so a
//!   context that outlives its cycle can no longer report

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::core::registry::SupervisedService;
use crate::error::ServiceError;
use crate::services::{ServiceContext, SupervisionHandle};
use crate::status::Status;

/// Runs one supervised cycle of `svc` with panic containment.
pub(crate) async fn run_supervised(
    svc: Arc<SupervisedService>,
    handle: SupervisionHandle,
    token: CancellationToken,
) {
    let ctx = ServiceContext::supervised(token.clone(), handle.clone());
    let cycle = AssertUnwindSafe(run_cycle(&svc, ctx, &handle))
        .catch_unwind()
        .await;

    if let Err(payload) = cycle {
        handle
            .emit(Status::Panic, Some(ServiceError::from_panic(&*payload)))
            .await;
    }
    token.cancel();
}

/// Optional initialization, then `run`; emits every transition.
async fn run_cycle(svc: &SupervisedService, ctx: ServiceContext, handle: &SupervisionHandle) {
    if let Some(init) = svc.service.as_initializer() {
        handle.emit(Status::Initializing, None).await;
        if let Err(e) = init.initialize(ctx.clone()).await {
            handle.emit(Status::Error, Some(e)).await;
            return;
        }
    }

    handle.emit(Status::Running, None).await;
    match svc.service.run(ctx).await {
        Ok(()) => handle.emit(Status::Stopped, None).await,
        Err(e) => handle.emit(Status::Error, Some(e)).await,
    }
}
