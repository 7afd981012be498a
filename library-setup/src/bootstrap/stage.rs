//! Stages, their outcomes and operator guidance

use crate::error::BootstrapError;
use crate::ingest::LoadReport;
use crate::settings::DbSettings;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// The four ordered bootstrap checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Database,
    Schema,
    SeedData,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Database => "database",
            Self::Schema => "schema",
            Self::SeedData => "seed data",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Precondition already held; nothing was changed.
    Satisfied,
    /// Precondition was false and the repair action ran.
    Repaired,
}

/// The first failing stage and why.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: BootstrapError,
}

impl StageFailure {
    /// Operator guidance: what to fix and what to run next.
    pub fn remediation(&self) -> String {
        match &self.error {
            BootstrapError::ConfigMissing { path, template } => format!(
                "Create {} with PG_HOST, PG_PORT, PG_USER, PG_PASSWORD and PG_DATABASE, \
                 or provide {} and run `bootstrap` to fill it in.",
                path.display(),
                template.display()
            ),
            BootstrapError::ConfigIncomplete { key } => format!(
                "{} needs a value. Run `bootstrap` and answer the configuration prompts.",
                key
            ),
            BootstrapError::ConfigInvalid { key, .. } => format!(
                "Fix {} in the config file, or run `bootstrap` to re-enter it.",
                key
            ),
            BootstrapError::Connection { .. } => "Check that PostgreSQL is running and that \
                 PG_HOST, PG_PORT, PG_USER and PG_PASSWORD are correct, then run `bootstrap` again."
                .to_string(),
            BootstrapError::SchemaFileMissing { path } => format!(
                "Place the schema script at {} (or set SETUP_SCHEMA_FILE), then run `bootstrap` again.",
                path.display()
            ),
            BootstrapError::SeedFileMissing { path, .. } => format!(
                "Provide the column table at {} (or set SETUP_SEED_FILE); it must contain the \
                 nro_columna header. Then run `bootstrap` again.",
                path.display()
            ),
            BootstrapError::Query { .. } | BootstrapError::Io { .. } => format!(
                "Resolve the {} problem above and run `bootstrap` again.",
                self.stage
            ),
        }
    }
}

/// What a successful run found and did.
#[derive(Debug, Clone)]
pub struct Report {
    pub settings: DbSettings,
    pub stages: Vec<(Stage, StageStatus)>,
    /// Present when the seed stage loaded data.
    pub seed: Option<LoadReport>,
}

impl Report {
    pub(crate) fn record(&mut self, stage: Stage, status: StageStatus) {
        match status {
            StageStatus::Satisfied => info!(stage = %stage, "Stage satisfied"),
            StageStatus::Repaired => info!(stage = %stage, "Stage repaired"),
        }
        self.stages.push((stage, status));
    }

    pub fn status(&self, stage: Stage) -> Option<StageStatus> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, status)| *status)
    }

    /// Stages whose repair action ran; empty when nothing changed.
    pub fn repaired_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|(_, status)| *status == StageStatus::Repaired)
            .map(|(stage, _)| *stage)
            .collect()
    }
}

/// Terminal result of a sequencer run.
#[derive(Debug)]
pub enum Outcome {
    Ready(Report),
    NotReady(StageFailure),
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
