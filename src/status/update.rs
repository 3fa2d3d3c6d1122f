//! # Status update snapshots.
//!
//! A [`StatusUpdate`] is produced by the launch sequence (or by a running
//! service through [`ServiceContext::report_transient_error`](crate::ServiceContext::report_transient_error)),
//! consumed once by the supervisor loop and folded into the health table.
//! Listeners only ever see copies.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::ServiceError;
use crate::status::Status;

/// Immutable snapshot of one supervised service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Stable id assigned by the registry (position among non-empty entries).
    pub service_id: usize,
    /// Display name resolved once at construction.
    pub service_name: Arc<str>,
    /// Time of the transition, from the supervisor's clock.
    pub time: SystemTime,
    /// New status.
    pub status: Status,
    /// Error carried by `Error`, `Panic` and `TransientError` updates.
    pub error: Option<ServiceError>,
}

impl StatusUpdate {
    /// Creates an update without an error.
    pub fn new(
        service_id: usize,
        service_name: impl Into<Arc<str>>,
        time: SystemTime,
        status: Status,
    ) -> Self {
        Self {
            service_id,
            service_name: service_name.into(),
            time,
            status,
            error: None,
        }
    }

    /// Attaches an error.
    #[inline]
    pub fn with_error(mut self, error: Option<ServiceError>) -> Self {
        self.error = error;
        self
    }

    /// Shorthand for `self.status.is_alive()`.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }

    /// Returns the attached error, if any.
    #[inline]
    pub fn error(&self) -> Option<&ServiceError> {
        self.error.as_ref()
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ServiceID: {}, ServiceName: {}, Time: {:?}, Status: {}, Err: ",
            self.service_id, self.service_name, self.time, self.status
        )?;
        match &self.error {
            Some(e) => write!(f, "{}}}", e.as_message()),
            None => f.write_str("<nil>}"),
        }
    }
}
