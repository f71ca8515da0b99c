//! Configuration system for par-source-windows.
//!
//! This crate provides configuration loading, saving, and default values
//! for the satellite source-window coordinator. It includes:
//!
//! - The top-level [`Config`] struct and its YAML persistence
//! - Typed [`ConfigError`] variants for I/O, parse and validation failures
//! - Default values grouped by concern in [`defaults`]

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::{LogLevel, WindowSize};
