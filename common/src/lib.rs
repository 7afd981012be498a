//! Shared utilities for the library setup binaries
//!
//! This crate provides common functionality used across all setup binaries:
//! - Structured logging initialization
//! - Environment variable parsing helpers
//! - Telemetry for reporting setup events

pub mod config;
pub mod logging;
pub mod telemetry;

pub use config::{ConfigExt, SetupEnv};
pub use logging::init_logging;
pub use telemetry::{SetupEvent, Telemetry};
