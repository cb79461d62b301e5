//! Registration records for the service registry.

use std::sync::Arc;

use futures::future::BoxFuture;
use maestro_service::{BoxError, Service};

use crate::error::Error;
use crate::state::ServiceState;

/// Future returned by a service factory.
pub(crate) type FactoryFuture = BoxFuture<'static, Result<Arc<dyn Service>, BoxError>>;

/// Shared zero-argument constructor producing a service instance.
///
/// Invoked at most once per live registration.
pub(crate) type ServiceFactory = Arc<dyn Fn() -> FactoryFuture + Send + Sync>;

/// Options declared at registration time.
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    /// Names of services that must be ready before this one initializes.
    /// They need not be registered yet; only by initialization time.
    pub dependencies: Vec<String>,
    /// Schedule a deferred initialization right after registration, so a
    /// synchronous batch of registrations completes before any of them
    /// starts initializing.
    pub auto_init: bool,
    /// Bulk ordering weight: higher initializes earlier and disposes later.
    pub priority: i32,
}

/// One registered service and everything known about it.
pub(crate) struct ServiceRegistration {
    pub(crate) factory: ServiceFactory,
    pub(crate) instance: Option<Arc<dyn Service>>,
    pub(crate) options: ServiceOptions,
    pub(crate) state: ServiceState,
    pub(crate) error: Option<Error>,
}
