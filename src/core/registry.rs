//! # Supervised-service registry.
//!
//! Binds every configured service to a stable identity at construction time:
//!
//! ```text
//! [Some(a), None, Some(b), Some(c)]  ──►  [#0 a, #1 b, #2 c]
//!                 └─ empty entries consume no id and are never supervised
//! ```
//!
//! ## Rules
//! - Ids are `0..N-1` in input order.
//! - Names are resolved once ([`Service::name`]) and never change.
//! - The registry is immutable after construction and owned by the supervisor.

use std::sync::Arc;

use crate::services::ServiceRef;

/// A service bound to its identity.
pub(crate) struct SupervisedService {
    pub(crate) id: usize,
    pub(crate) name: Arc<str>,
    pub(crate) initializes: bool,
    pub(crate) service: ServiceRef,
}

impl SupervisedService {
    fn new(id: usize, service: ServiceRef) -> Self {
        Self {
            id,
            name: Arc::from(service.name()),
            initializes: service.as_initializer().is_some(),
            service,
        }
    }

    pub(crate) fn info(&self) -> ServiceInfo {
        ServiceInfo {
            id: self.id,
            name: Arc::clone(&self.name),
            initializes: self.initializes,
        }
    }
}

/// Read-only description of a supervised service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Stable id (index into every health snapshot).
    pub id: usize,
    /// Display name.
    pub name: Arc<str>,
    /// Whether the service runs an initialization step before `run`.
    pub initializes: bool,
}

/// Immutable id → service table.
pub(crate) struct Registry {
    services: Vec<Arc<SupervisedService>>,
}

impl Registry {
    /// Enumerates `services`, skipping empty entries and assigning sequential ids.
    pub(crate) fn new(services: Vec<Option<ServiceRef>>) -> Self {
        let services = services
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(id, service)| Arc::new(SupervisedService::new(id, service)))
            .collect();
        Self { services }
    }

    pub(crate) fn len(&self) -> usize {
        self.services.len()
    }

    pub(crate) fn get(&self, id: usize) -> Option<&Arc<SupervisedService>> {
        self.services.get(id)
    }

    pub(crate) fn infos(&self) -> Vec<ServiceInfo> {
        self.services.iter().map(|s| s.info()).collect()
    }
}
