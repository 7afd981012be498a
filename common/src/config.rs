//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading the setup tool's own settings from
//! environment variables. Database credentials are NOT read here; they live
//! in the project's config file and are handled by `library-setup`.

use std::env;
use std::path::PathBuf;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let seed = String::env_or("SETUP_SEED_FILE", "columnas-analisis.md");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

/// Settings of the setup tool itself.
///
/// Every path is relative to the working directory unless overridden.
pub struct SetupEnv;

impl SetupEnv {
    /// Live database config file (`KEY = "VALUE"` lines).
    pub fn env_file() -> PathBuf {
        PathBuf::from(String::env_or("SETUP_ENV_FILE", ".env"))
    }

    /// Template copied to `env_file()` when the live file is absent.
    pub fn env_template() -> PathBuf {
        PathBuf::from(String::env_or("SETUP_ENV_TEMPLATE", "example.env"))
    }

    /// DDL script that creates every required table.
    pub fn schema_file() -> PathBuf {
        PathBuf::from(String::env_or("SETUP_SCHEMA_FILE", "schema-mylib.sql"))
    }

    /// Markdown table with the column metadata seed rows.
    pub fn seed_file() -> PathBuf {
        PathBuf::from(String::env_or("SETUP_SEED_FILE", "columnas-analisis.md"))
    }

    /// Database that always exists on the server; used for CREATE DATABASE.
    pub fn admin_database() -> String {
        String::env_or("SETUP_ADMIN_DATABASE", "postgres")
    }

    /// Optional HTTP endpoint receiving setup events as JSON.
    pub fn telemetry_endpoint() -> Option<String> {
        env::var("SETUP_TELEMETRY_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// Whether logs should be emitted as JSON lines.
    pub fn json_logs() -> bool {
        String::env_or("SETUP_LOG_FORMAT", "text").eq_ignore_ascii_case("json")
    }
}
