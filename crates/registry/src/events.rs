//! Lifecycle notifications broadcast by the registry.

/// A lifecycle transition announcement.
///
/// Delivered to subscribers in emission order. Each subscriber owns an
/// independent queue, so one consumer cannot interrupt delivery to others.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// A name was registered, or re-registered over an existing entry.
    Registered {
        /// Service name.
        name: String,
        /// True when an existing registration was replaced.
        replaced: bool,
    },

    /// Initialization started.
    Initializing {
        /// Service name.
        name: String,
    },

    /// Initialization completed; the service is available.
    Ready {
        /// Service name.
        name: String,
    },

    /// Initialization or disposal failed.
    Error {
        /// Service name.
        name: String,
        /// Message of the failure.
        message: String,
    },

    /// Disposal started.
    Disposing {
        /// Service name.
        name: String,
    },

    /// Disposal completed.
    Disposed {
        /// Service name.
        name: String,
    },
}

impl ServiceEvent {
    /// Name of the service the event refers to.
    #[must_use]
    pub fn service_name(&self) -> &str {
        match self {
            Self::Registered { name, .. }
            | Self::Initializing { name }
            | Self::Ready { name }
            | Self::Error { name, .. }
            | Self::Disposing { name }
            | Self::Disposed { name } => name,
        }
    }
}
