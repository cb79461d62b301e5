//! Error types for the service registry.

use std::sync::Arc;

use thiserror::Error;

use crate::state::ServiceState;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shared cause for failures originating in service code.
///
/// Held behind an `Arc` so the same failure can be recorded by every
/// transitive dependent and re-raised verbatim to each waiting caller.
type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The requested name has no registration.
    #[error("service not registered: {0}")]
    NotRegistered(String),

    /// The name is already mid-resolution, either through a genuine
    /// dependency cycle or a concurrent caller racing the same name.
    #[error("circular dependency detected while resolving service: {0}")]
    CircularDependency(String),

    /// The registration exists but the service has not been initialized.
    #[error("service {name} is not initialized (state: {state})")]
    NotInitialized {
        /// Service name.
        name: String,
        /// State observed at read time.
        state: ServiceState,
    },

    /// Construction or `init()` failed, or a dependency failed first.
    #[error("service {name} failed to initialize: {source}")]
    InitializationFailed {
        /// Service name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Cause,
    },

    /// `dispose()` failed; the registration remains in the error state.
    #[error("service {name} failed to dispose: {source}")]
    DisposalFailed {
        /// Service name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Cause,
    },

    /// The service previously failed and the failure is on record.
    #[error("service {name} is in error state: {message}")]
    Failed {
        /// Service name.
        name: String,
        /// Message of the recorded failure.
        message: String,
    },

    /// The service has been disposed.
    #[error("service has been disposed: {0}")]
    Disposed(String),
}
