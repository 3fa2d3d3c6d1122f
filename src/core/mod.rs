//! Runtime core: registry, event loop and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (with its
//! [`SupervisorBuilder`] and [`SupervisorConfig`]) plus [`ServiceInfo`].
//!
//! Internal modules:
//! - [`registry`]: binds services to stable ids and names;
//! - [`health`]: latest status per service id, owned by the event loop;
//! - [`launcher`]: one run cycle of a service with panic containment;
//! - [`supervisor`]: the single-writer event loop, restarts and drain;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod health;
mod launcher;
mod registry;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use registry::ServiceInfo;
pub use supervisor::{Listener, Supervisor};
