//! # Service and Initializer capabilities.
//!
//! A [`Service`] has a blocking (until done or cancelled) [`run`](Service::run)
//! and optionally exposes a display name and an [`Initialize`] step. Both
//! optional capabilities are plain trait methods with defaults, resolved once
//! when the supervisor builds its registry.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use servicevisor::{Initialize, Service, ServiceContext, ServiceError};
//!
//! struct Cache;
//!
//! #[async_trait]
//! impl Initialize for Cache {
//!     async fn initialize(&self, _ctx: ServiceContext) -> Result<(), ServiceError> {
//!         // warm up...
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl Service for Cache {
//!     fn name(&self) -> &str { "cache" }
//!
//!     fn as_initializer(&self) -> Option<&dyn Initialize> { Some(self) }
//!
//!     async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
//!         ctx.cancelled().await;
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::services::ServiceContext;

/// # Shared handle to a service object.
pub type ServiceRef = Arc<dyn Service>;

/// Long-lived unit of work managed by a [`Supervisor`](crate::Supervisor).
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns the display name used in status updates.
    ///
    /// The default derives `module::Type` from the concrete type; override it when possible.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Returns the initialization capability, if the service has one.
    ///
    /// Services that also implement [`Initialize`] override this with `Some(self)`.
    fn as_initializer(&self) -> Option<&dyn Initialize> {
        None
    }

    /// Runs the service until it finishes or `ctx` is cancelled.
    ///
    /// `Ok(())` ends the cycle as `Stopped`, `Err(_)` as `Error`.
    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError>;
}

/// Optional pre-run step; a failure ends the cycle as `Error` without ever reaching `Running`.
#[async_trait]
pub trait Initialize: Send + Sync + 'static {
    /// Prepares the service; called before every [`Service::run`].
    async fn initialize(&self, ctx: ServiceContext) -> Result<(), ServiceError>;
}

/// Trims a full type path to its last module and type name, without generics.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rmatch_indices("::").nth(1) {
        Some((idx, _)) => &base[idx + 2..],
        None => base,
    }
}
