//! # Health table.
//!
//! Latest [`StatusUpdate`] per service id. Owned by the supervisor event loop
//! and only ever touched from it, so it needs no locking.
//!
//! Each slot also remembers the number of the service's current launch.
//! Updates tagged with an older launch, or arriving after the current launch
//! already reached a terminal status, come from a finished run cycle and must
//! not be folded in.

use crate::status::StatusUpdate;

/// Per-service-id latest status; fixed length for the supervisor's lifetime.
pub(crate) struct HealthTable {
    entries: Vec<Option<StatusUpdate>>,
    launches: Vec<u64>,
}

impl HealthTable {
    /// Creates a table of `len` empty slots.
    pub(crate) fn new(len: usize) -> Self {
        Self {
            entries: vec![None; len],
            launches: vec![0; len],
        }
    }

    /// Starts a new run cycle: stores its `Idle` update and returns the new launch number.
    ///
    /// Returns `None` for an unknown id.
    pub(crate) fn begin_launch(&mut self, idle: StatusUpdate) -> Option<u64> {
        let launch = self.launches.get_mut(idle.service_id)?;
        *launch += 1;
        let current = *launch;
        self.set(idle).then_some(current)
    }

    /// Returns true if an update from `launch` may still change service `id`:
    /// it is the current launch and that run cycle has not ended yet.
    pub(crate) fn accepts(&self, id: usize, launch: u64) -> bool {
        self.launches.get(id) == Some(&launch) && self.get(id).is_some_and(StatusUpdate::is_alive)
    }

    /// Stores `update` in its service slot. Returns false for an unknown id.
    pub(crate) fn set(&mut self, update: StatusUpdate) -> bool {
        match self.entries.get_mut(update.service_id) {
            Some(slot) => {
                *slot = Some(update);
                true
            }
            None => false,
        }
    }

    pub(crate) fn get(&self, id: usize) -> Option<&StatusUpdate> {
        self.entries.get(id).and_then(Option::as_ref)
    }

    /// Returns true if any service's current run cycle is still going.
    pub(crate) fn any_alive(&self) -> bool {
        self.alive().next().is_some()
    }

    /// Iterates the entries whose status is alive.
    pub(crate) fn alive(&self) -> impl Iterator<Item = &StatusUpdate> {
        self.entries.iter().flatten().filter(|u| u.is_alive())
    }

    /// Ids of services whose current run cycle has ended.
    pub(crate) fn terminated(&self) -> Vec<usize> {
        self.entries
            .iter()
            .flatten()
            .filter(|u| !u.is_alive())
            .map(|u| u.service_id)
            .collect()
    }

    /// Copies the table into an ordered sequence.
    ///
    /// Every slot is filled once all services have been launched, so the
    /// snapshot then always has one entry per service.
    pub(crate) fn snapshot(&self) -> Vec<StatusUpdate> {
        self.entries.iter().flatten().cloned().collect()
    }
}
