//! Lifecycle states for registered services.

use std::fmt;

/// Lifecycle state of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Registered but not yet initialized.
    Registered,
    /// Initialization is in flight.
    Initializing,
    /// Initialized and available.
    Ready,
    /// Initialization or disposal failed; the failure is on record.
    Error,
    /// Disposed and no longer available.
    Disposed,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Registered => "registered",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Disposed => "disposed",
        };
        f.write_str(state)
    }
}
