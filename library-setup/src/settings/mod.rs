//! Database settings stored in the project's config file
//!
//! - Reading and atomically writing `KEY = "VALUE"` files
//! - Required keys and their prompts
//! - Interactive repair behind the `Prompter` trait

mod file;
pub mod keys;
mod prompt;
mod store;

pub use file::ConfigFile;
pub use keys::{RequiredKey, REQUIRED_KEYS};
pub use prompt::{Prompter, StdinPrompter};
#[cfg(test)]
pub(crate) use prompt::ScriptedPrompter;
pub use store::{missing_keys, ConfigStore, DbSettings, EnsuredConfig, PlannedPrompt, RepairPlan};
