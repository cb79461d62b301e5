//! Registry configuration.

/// Configuration for a [`ServiceRegistry`](crate::ServiceRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of the lifecycle event broadcast channel. Subscribers that
    /// lag further than this lose their own oldest events.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            event_capacity: 128,
        }
    }
}
