use std::fmt;

use super::Logger;

/// Logger that discards everything (the supervisor default).
#[derive(Clone, Copy, Debug, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn debug(&self, _args: fmt::Arguments<'_>) {}

    fn warning(&self, _args: fmt::Arguments<'_>) {}
}
