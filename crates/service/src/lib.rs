//! Capability contract for services managed by the lifecycle registry.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use async_trait::async_trait;

/// Boxed error returned by service lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for services managed by the lifecycle registry.
///
/// Every registered value must provide an asynchronous initializer.
/// Teardown is optional; the default implementation does nothing.
#[async_trait]
pub trait Service
where
    Self: Send + Sync + 'static,
{
    /// Initialize the service.
    ///
    /// Invoked exactly once after construction, once all of the service's
    /// declared dependencies are ready.
    async fn init(&self) -> Result<(), BoxError>;

    /// Release resources held by the service.
    ///
    /// Invoked at most once, during teardown.
    async fn dispose(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Service")
    }
}
