//! The service registry and lifecycle orchestrator.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use maestro_service::{BoxError, Service};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, warn};

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::events::ServiceEvent;
use crate::registration::{ServiceFactory, ServiceOptions, ServiceRegistration};
use crate::state::ServiceState;

/// Shared store: registrations plus the in-flight marker set that guards
/// against re-entrant resolution. Kept behind a single lock so admission
/// checks and state transitions are atomic under a multi-threaded runtime.
struct RegistryInner {
    services: HashMap<String, ServiceRegistration>,
    in_flight: HashSet<String>,
}

/// Named-service registry with dependency-ordered asynchronous
/// initialization.
///
/// Cloning is cheap; clones share the same store and notification channel.
#[derive(Clone)]
pub struct ServiceRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    events: broadcast::Sender<ServiceEvent>,
}

impl ServiceRegistry {
    /// Create a registry with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                services: HashMap::new(),
                in_flight: HashSet::new(),
            })),
            events,
        }
    }

    /// Subscribe to lifecycle notifications.
    ///
    /// Delivery order matches emission order. Each receiver owns its own
    /// queue, so a slow consumer only lags its own copy of the stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events.subscribe()
    }

    /// Register a named service.
    ///
    /// An existing registration under the same name is replaced wholesale;
    /// its instance, if any, is discarded without disposal.
    pub async fn register<F, Fut>(
        &self,
        name: impl Into<String>,
        factory: F,
        options: ServiceOptions,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Arc<dyn Service>, BoxError>> + Send + 'static,
    {
        let name = name.into();
        let factory: ServiceFactory = Arc::new(move || Box::pin(factory()));
        let auto_init = options.auto_init;

        let replaced = {
            let mut inner = self.inner.write().await;
            inner
                .services
                .insert(
                    name.clone(),
                    ServiceRegistration {
                        factory,
                        instance: None,
                        options,
                        state: ServiceState::Registered,
                        error: None,
                    },
                )
                .is_some()
        };

        if replaced {
            warn!(service = %name, "replacing existing service registration");
        } else {
            debug!(service = %name, "registered service");
        }
        self.emit(ServiceEvent::Registered {
            name: name.clone(),
            replaced,
        });

        if auto_init {
            let registry = self.clone();
            tokio::spawn(async move {
                if let Err(e) = registry.init_service(&name).await {
                    warn!(service = %name, error = %e, "auto-initialization failed");
                }
            });
        }
    }

    /// Initialize a service, resolving its declared dependencies first.
    ///
    /// Dependencies are resolved concurrently and are all ready before the
    /// service's own instance is constructed or initialized. Returns the
    /// cached instance when the service is already ready; a service that
    /// previously failed or was disposed stays that way until the name is
    /// re-registered.
    ///
    /// # Errors
    ///
    /// Fails when the name is unregistered, already mid-resolution, in a
    /// terminal state, or when construction, a dependency, or the
    /// instance's own `init()` fails.
    pub async fn init_service(&self, name: &str) -> Result<Arc<dyn Service>> {
        self.resolve(name.to_owned()).await
    }

    /// Recursive resolution step, boxed so dependency fan-out can re-enter.
    fn resolve(&self, name: String) -> BoxFuture<'_, Result<Arc<dyn Service>>> {
        Box::pin(async move {
            let (factory, dependencies) = {
                let mut inner = self.inner.write().await;
                let Some(registration) = inner.services.get(&name) else {
                    return Err(Error::NotRegistered(name));
                };
                match registration.state {
                    ServiceState::Ready => {
                        if let Some(instance) = &registration.instance {
                            return Ok(Arc::clone(instance));
                        }
                    }
                    ServiceState::Error => {
                        if let Some(stored) = &registration.error {
                            return Err(stored.clone());
                        }
                    }
                    ServiceState::Disposed => return Err(Error::Disposed(name)),
                    ServiceState::Registered | ServiceState::Initializing => {}
                }
                if inner.in_flight.contains(&name) {
                    warn!(service = %name, "re-entrant resolution rejected");
                    return Err(Error::CircularDependency(name));
                }
                let Some(registration) = inner.services.get_mut(&name) else {
                    return Err(Error::NotRegistered(name));
                };
                registration.state = ServiceState::Initializing;
                let factory = Arc::clone(&registration.factory);
                let dependencies = registration.options.dependencies.clone();
                inner.in_flight.insert(name.clone());
                (factory, dependencies)
            };

            debug!(service = %name, "initializing service");
            self.emit(ServiceEvent::Initializing { name: name.clone() });

            let result = self.run_init(&name, factory, dependencies).await;

            {
                let mut inner = self.inner.write().await;
                inner.in_flight.remove(&name);
                if let Some(registration) = inner.services.get_mut(&name) {
                    match &result {
                        Ok(instance) => {
                            registration.instance = Some(Arc::clone(instance));
                            registration.state = ServiceState::Ready;
                            registration.error = None;
                        }
                        Err(e) => {
                            registration.state = ServiceState::Error;
                            registration.error = Some(e.clone());
                        }
                    }
                }
            }

            match &result {
                Ok(_) => {
                    info!(service = %name, "service ready");
                    self.emit(ServiceEvent::Ready { name: name.clone() });
                }
                Err(e) => {
                    error!(service = %name, error = %e, "service initialization failed");
                    self.emit(ServiceEvent::Error {
                        name: name.clone(),
                        message: e.to_string(),
                    });
                }
            }

            result
        })
    }

    /// Dependency fan-out, construction, and the instance's own `init()`.
    async fn run_init(
        &self,
        name: &str,
        factory: ServiceFactory,
        dependencies: Vec<String>,
    ) -> Result<Arc<dyn Service>> {
        if !dependencies.is_empty() {
            debug!(service = %name, ?dependencies, "resolving dependencies");
            let results = join_all(dependencies.iter().map(|dep| self.resolve(dep.clone()))).await;
            // Every dependency task is awaited; the first failure in
            // declaration order wins and the remaining results are ignored.
            for result in results {
                result?;
            }
        }

        let existing = {
            let inner = self.inner.read().await;
            inner.services.get(name).and_then(|r| r.instance.clone())
        };

        let instance = match existing {
            Some(instance) => instance,
            None => {
                let instance =
                    (*factory)()
                        .await
                        .map_err(|source| Error::InitializationFailed {
                            name: name.to_owned(),
                            source: Arc::from(source),
                        })?;
                let mut inner = self.inner.write().await;
                if let Some(registration) = inner.services.get_mut(name) {
                    registration.instance = Some(Arc::clone(&instance));
                }
                instance
            }
        };

        instance
            .init()
            .await
            .map_err(|source| Error::InitializationFailed {
                name: name.to_owned(),
                source: Arc::from(source),
            })?;

        Ok(instance)
    }

    /// Return the already-initialized instance for `name`.
    ///
    /// Pure read: never triggers initialization.
    ///
    /// # Errors
    ///
    /// Fails when the name is unregistered, when the service is in the
    /// error state (the message includes the recorded failure), when it has
    /// been disposed, or when no instance exists yet.
    pub async fn get_service(&self, name: &str) -> Result<Arc<dyn Service>> {
        let inner = self.inner.read().await;
        let Some(registration) = inner.services.get(name) else {
            return Err(Error::NotRegistered(name.to_owned()));
        };
        match registration.state {
            ServiceState::Error => Err(Error::Failed {
                name: name.to_owned(),
                message: registration
                    .error
                    .as_ref()
                    .map_or_else(String::new, ToString::to_string),
            }),
            ServiceState::Disposed => Err(Error::Disposed(name.to_owned())),
            _ => registration
                .instance
                .clone()
                .ok_or_else(|| Error::NotInitialized {
                    name: name.to_owned(),
                    state: registration.state,
                }),
        }
    }

    /// Whether `name` has a live registration.
    pub async fn has_service(&self, name: &str) -> bool {
        self.inner.read().await.services.contains_key(name)
    }

    /// Current lifecycle state of `name`, or `None` if never registered.
    pub async fn service_state(&self, name: &str) -> Option<ServiceState> {
        self.inner.read().await.services.get(name).map(|r| r.state)
    }

    /// Names of all registered services, in no particular order.
    pub async fn service_names(&self) -> Vec<String> {
        self.inner.read().await.services.keys().cloned().collect()
    }

    /// Dispose a single service.
    ///
    /// No-op when the name is unregistered, has no instance, or is already
    /// disposed.
    ///
    /// # Errors
    ///
    /// A disposal failure leaves the registration in the error state and
    /// is returned to the caller.
    pub async fn dispose_service(&self, name: &str) -> Result<()> {
        let instance = {
            let inner = self.inner.read().await;
            let Some(registration) = inner.services.get(name) else {
                return Ok(());
            };
            if registration.state == ServiceState::Disposed {
                return Ok(());
            }
            match registration.instance.clone() {
                Some(instance) => instance,
                None => return Ok(()),
            }
        };

        debug!(service = %name, "disposing service");
        self.emit(ServiceEvent::Disposing {
            name: name.to_owned(),
        });

        match instance.dispose().await {
            Ok(()) => {
                let mut inner = self.inner.write().await;
                if let Some(registration) = inner.services.get_mut(name) {
                    registration.state = ServiceState::Disposed;
                }
                drop(inner);
                info!(service = %name, "service disposed");
                self.emit(ServiceEvent::Disposed {
                    name: name.to_owned(),
                });
                Ok(())
            }
            Err(source) => {
                let err = Error::DisposalFailed {
                    name: name.to_owned(),
                    source: Arc::from(source),
                };
                let mut inner = self.inner.write().await;
                if let Some(registration) = inner.services.get_mut(name) {
                    registration.state = ServiceState::Error;
                    registration.error = Some(err.clone());
                }
                drop(inner);
                error!(service = %name, error = %err, "service disposal failed");
                self.emit(ServiceEvent::Error {
                    name: name.to_owned(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Initialize every registered service.
    ///
    /// Root resolutions are started in descending priority order; actual
    /// completion order is governed by the dependency graph.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure; sibling resolutions are not
    /// cancelled.
    pub async fn init_all(&self) -> Result<Vec<Arc<dyn Service>>> {
        let names = self.names_by_priority(true).await;
        info!(count = names.len(), "initializing all services");
        join_all(names.iter().map(|name| self.resolve(name.clone())))
            .await
            .into_iter()
            .collect()
    }

    /// Dispose every registered service, lowest priority first, strictly
    /// one at a time.
    ///
    /// # Errors
    ///
    /// The first disposal failure aborts the sequence and is returned.
    pub async fn dispose_all(&self) -> Result<()> {
        let names = self.names_by_priority(false).await;
        info!(count = names.len(), "disposing all services");
        for name in &names {
            self.dispose_service(name).await?;
        }
        Ok(())
    }

    /// Dispose everything, then clear the store and the in-flight set.
    ///
    /// # Errors
    ///
    /// A disposal failure aborts the reset before anything is cleared.
    pub async fn reset(&self) -> Result<()> {
        self.dispose_all().await?;
        let mut inner = self.inner.write().await;
        inner.services.clear();
        inner.in_flight.clear();
        drop(inner);
        info!("service registry reset");
        Ok(())
    }

    /// Registered names sorted by priority. Ties are unordered.
    async fn names_by_priority(&self, descending: bool) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut entries: Vec<(String, i32)> = inner
            .services
            .iter()
            .map(|(name, registration)| (name.clone(), registration.options.priority))
            .collect();
        drop(inner);
        if descending {
            entries.sort_by_key(|(_, priority)| Reverse(*priority));
        } else {
            entries.sort_by_key(|(_, priority)| *priority);
        }
        entries.into_iter().map(|(name, _)| name).collect()
    }

    fn emit(&self, event: ServiceEvent) {
        // Emission with no subscribers is not an error.
        let _ = self.events.send(event);
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
