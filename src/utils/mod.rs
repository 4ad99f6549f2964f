//! Shared utilities

pub mod config;

pub use config::{ConfigError, FilterConfig, MapperConfig, TrackingConfig};
