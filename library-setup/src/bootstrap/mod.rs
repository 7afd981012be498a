//! Bootstrap sequencer
//!
//! Brings a fresh deployment to "ready to serve" in four ordered stages:
//! config file, target database, schema, seed data.

mod announce;
mod sequencer;
mod stage;

pub use announce::announce;
pub use sequencer::{Artifacts, ConfigMode, Sequencer};
pub use stage::{Outcome, Report, Stage, StageFailure, StageStatus};
