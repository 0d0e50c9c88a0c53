//! Runtime plumbing shared by the registry server: layered configuration
//! and tracing/logging initialization.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, AuthConfig, CliArgs, DatabaseConfig, LoggingConfig, LogSection, ServerConfig,
};
