//! # Service abstractions.
//!
//! This module provides the unit-of-work contract supervised by the runtime:
//! - [`Service`] - trait for long-lived async services
//! - [`Initialize`] - optional pre-run initialization capability
//! - [`ServiceFn`] / [`InitServiceFn`] - closure-backed implementations
//! - [`ServiceContext`] - the supervised context handed to `run`/`initialize`
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)

mod context;
mod service;
mod service_fn;

pub use context::{ServiceContext, report_transient_error};
pub use service::{Initialize, Service, ServiceRef};
pub use service_fn::{InitServiceFn, ServiceFn};

pub(crate) use context::{LaunchUpdate, SupervisionHandle};
