//! HTTP inference service: startup, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod startup;

pub use config::{ConfigError, DocsConfig, ServeConfig};
pub use context::{ModelContext, PredictError};
pub use startup::{ServiceState, Startup, StartupError};
