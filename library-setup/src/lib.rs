//! Environment setup for the article library
//!
//! Verifies and repairs everything the web application needs before it can
//! serve requests, in dependency order and idempotently:
//! - `settings`: the database config file and its interactive repair
//! - `db`: autocommit sessions on the admin and target databases
//! - `ingest`: the column metadata table parser and loader
//! - `bootstrap`: the four-stage sequencer tying them together

pub mod bootstrap;
pub mod db;
pub mod error;
pub mod ingest;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{Artifacts, Outcome, Report, Sequencer, Stage, StageFailure, StageStatus};
pub use common::{ConfigExt, SetupEnv, SetupEvent, Telemetry};
pub use db::{Connector, PgConnector, Session};
pub use error::BootstrapError;
pub use ingest::{parse_table, reload, LoadReport};
pub use settings::{ConfigStore, DbSettings, Prompter, StdinPrompter};
