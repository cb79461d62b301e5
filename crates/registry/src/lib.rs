//! Service lifecycle orchestration over named, lazily constructed services.
//!
//! A [`ServiceRegistry`] accepts named factories with declared dependencies
//! and priorities, resolves asynchronous initialization in dependency order,
//! tracks each service through an explicit state machine, rejects re-entrant
//! resolution, and broadcasts lifecycle transitions to subscribers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = ServiceRegistry::new();
//!
//! registry
//!     .register(
//!         "database",
//!         || async { Ok(Arc::new(Database::connect().await?) as Arc<dyn Service>) },
//!         ServiceOptions::default(),
//!     )
//!     .await;
//!
//! let database = registry.init_service("database").await?;
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;
mod events;
mod registration;
mod registry;
mod state;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use events::ServiceEvent;
pub use registration::ServiceOptions;
pub use registry::ServiceRegistry;
pub use state::ServiceState;

pub use maestro_service::{BoxError, Service};
