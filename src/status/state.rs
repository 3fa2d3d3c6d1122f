//! # Service health states.
//!
//! [`Status`] is totally ordered; the order exists only to express
//! [`Status::is_alive`]: everything before [`Status::Stopped`] is alive.

use std::fmt;

/// Current health of a supervised service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// Launched, waiting to be scheduled.
    #[default]
    Idle,
    /// Running the optional initialization step.
    Initializing,
    /// Running and healthy.
    Running,
    /// Running, but the service reported a transient (recoverable) error.
    TransientError,
    /// Run returned without an error.
    Stopped,
    /// Run or initialization returned an error.
    Error,
    /// The service panicked; the fault was contained at the task boundary.
    Panic,
}

impl Status {
    /// Every status, in order.
    pub const ALL: [Status; 7] = [
        Status::Idle,
        Status::Initializing,
        Status::Running,
        Status::TransientError,
        Status::Stopped,
        Status::Error,
        Status::Panic,
    ];

    /// Returns true while the service's current run cycle has not terminated.
    ///
    /// # Example
    /// ```
    /// use servicevisor::Status;
    ///
    /// assert!(Status::TransientError.is_alive());
    /// assert!(!Status::Stopped.is_alive());
    /// ```
    #[inline]
    pub fn is_alive(self) -> bool {
        self < Status::Stopped
    }

    /// Returns the status name as shown by [`Display`](fmt::Display).
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "Idle",
            Status::Initializing => "Initializing",
            Status::Running => "Running",
            Status::TransientError => "TransientError",
            Status::Stopped => "Stopped",
            Status::Error => "Error",
            Status::Panic => "Panic",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
