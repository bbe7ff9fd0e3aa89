//! Infrastructure layer: stores, sessions, configuration.

pub mod config;
pub mod session;
pub mod store;

mod integration_tests;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use session::InMemorySessionStore;
