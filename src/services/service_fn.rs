//! # Closure-backed services (`ServiceFn`, `InitServiceFn`)
//!
//! [`ServiceFn`] wraps a closure `F: Fn(ServiceContext) -> Fut`, producing a fresh
//! future per launch. No state is shared between relaunches unless the closure
//! captures it explicitly (e.g. an `Arc<...>` cloned inside).
//!
//! [`InitServiceFn`] does the same for services with an initialization step.
//!
//! ## Example
//! ```rust
//! use servicevisor::{Service, ServiceContext, ServiceError, ServiceFn, ServiceRef};
//!
//! let svc: ServiceRef = ServiceFn::arc("worker", |ctx: ServiceContext| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, ServiceError>(())
//! });
//!
//! assert_eq!(svc.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::services::{Initialize, Service, ServiceContext};

/// Function-backed service.
#[derive(Debug)]
pub struct ServiceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> ServiceFn<F>
where
    F: Fn(ServiceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    /// Creates a new function-backed service.
    ///
    /// Prefer [`ServiceFn::arc`] when you immediately need a [`ServiceRef`](crate::ServiceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Service for ServiceFn<F>
where
    F: Fn(ServiceContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        (self.f)(ctx).await
    }
}

/// Function-backed service with an initialization step.
///
/// ## Example
/// ```rust
/// use servicevisor::{InitServiceFn, Service, ServiceContext, ServiceError, ServiceRef};
///
/// let svc: ServiceRef = InitServiceFn::arc(
///     "db",
///     |_ctx: ServiceContext| async { Err::<(), _>(ServiceError::fail("no route to host")) },
///     |ctx: ServiceContext| async move {
///         ctx.cancelled().await;
///         Ok::<_, ServiceError>(())
///     },
/// );
///
/// assert!(svc.as_initializer().is_some());
/// ```
#[derive(Debug)]
pub struct InitServiceFn<I, R> {
    name: Cow<'static, str>,
    init: I,
    run: R,
}

impl<I, IFut, R, RFut> InitServiceFn<I, R>
where
    I: Fn(ServiceContext) -> IFut + Send + Sync + 'static,
    IFut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    R: Fn(ServiceContext) -> RFut + Send + Sync + 'static,
    RFut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    /// Creates a new service from an initialize closure and a run closure.
    pub fn new(name: impl Into<Cow<'static, str>>, init: I, run: R) -> Self {
        Self {
            name: name.into(),
            init,
            run,
        }
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, init: I, run: R) -> Arc<Self> {
        Arc::new(Self::new(name, init, run))
    }
}

#[async_trait]
impl<I, IFut, R> Initialize for InitServiceFn<I, R>
where
    I: Fn(ServiceContext) -> IFut + Send + Sync + 'static,
    IFut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    R: Send + Sync + 'static,
{
    async fn initialize(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        (self.init)(ctx).await
    }
}

#[async_trait]
impl<I, IFut, R, RFut> Service for InitServiceFn<I, R>
where
    I: Fn(ServiceContext) -> IFut + Send + Sync + 'static,
    IFut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    R: Fn(ServiceContext) -> RFut + Send + Sync + 'static,
    RFut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn as_initializer(&self) -> Option<&dyn Initialize> {
        Some(self)
    }

    async fn run(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        (self.run)(ctx).await
    }
}
