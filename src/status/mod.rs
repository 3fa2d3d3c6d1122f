//! Health model: service statuses and the snapshots emitted on every transition.
//!
//! ## Contents
//! - [`Status`] closed enumeration of health states plus the "alive" rule
//! - [`StatusUpdate`] immutable snapshot of one service at one point in time
//!
//! ## Transitions
//! ```text
//! Idle ─► (Initializing ─►)? Running ⇄ TransientError ─► { Stopped | Error | Panic }
//! ```
//! The first four states are alive; the last three end the current run cycle
//! and make the service eligible for relaunch on the next restart tick.

mod state;
mod update;

pub use state::Status;
pub use update::StatusUpdate;
