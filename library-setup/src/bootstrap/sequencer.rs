//! Ordered, idempotent bootstrap
//!
//! Each stage checks live state and repairs only when its precondition is
//! false. Nothing records that a stage already ran, so a rerun after a crash
//! at any point resumes at the first stage that still fails.

use super::stage::{Outcome, Report, Stage, StageFailure, StageStatus};
use crate::db::{Connector, Session, METADATA_TABLE, REQUIRED_TABLES};
use crate::error::{BootstrapError, Result};
use crate::ingest::{parse_table, reload, LoadReport};
use crate::settings::{ConfigStore, DbSettings, Prompter};
use common::SetupEnv;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Files the schema and seed stages read.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub schema_file: PathBuf,
    pub seed_file: PathBuf,
}

impl Artifacts {
    pub fn from_env() -> Self {
        Self {
            schema_file: SetupEnv::schema_file(),
            seed_file: SetupEnv::seed_file(),
        }
    }
}

/// How the config stage treats an absent or incomplete file.
pub enum ConfigMode<'p> {
    /// Fail; never prompt or copy the template.
    Strict,
    /// Copy the template if needed and ask the operator.
    Interactive(&'p mut dyn Prompter),
}

pub struct Sequencer<'p, C: Connector> {
    store: ConfigStore,
    connector: C,
    artifacts: Artifacts,
    mode: ConfigMode<'p>,
}

impl<'p, C: Connector> Sequencer<'p, C> {
    /// A strict sequencer; see `interactive`.
    pub fn new(store: ConfigStore, connector: C, artifacts: Artifacts) -> Self {
        Self {
            store,
            connector,
            artifacts,
            mode: ConfigMode::Strict,
        }
    }

    pub fn interactive(mut self, prompter: &'p mut dyn Prompter) -> Self {
        self.mode = ConfigMode::Interactive(prompter);
        self
    }

    pub fn strict(mut self) -> Self {
        self.mode = ConfigMode::Strict;
        self
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.mode, ConfigMode::Interactive(_))
    }

    /// Run all stages in order, stopping at the first failure.
    pub async fn run(&mut self) -> Outcome {
        info!("Validating application environment");

        let (settings, status) = match self.config_stage() {
            Ok(found) => found,
            Err(e) => return fail(Stage::Config, e),
        };
        let mut report = Report {
            settings,
            stages: Vec::new(),
            seed: None,
        };
        report.record(Stage::Config, status);

        let status = match self.database_stage(&report.settings).await {
            Ok(status) => status,
            Err(e) => return fail(Stage::Database, e),
        };
        report.record(Stage::Database, status);

        let status = match self.schema_stage(&report.settings).await {
            Ok(status) => status,
            Err(e) => return fail(Stage::Schema, e),
        };
        report.record(Stage::Schema, status);

        let (status, seed) = match self.seed_stage(&report.settings).await {
            Ok(found) => found,
            Err(e) => return fail(Stage::SeedData, e),
        };
        report.seed = seed;
        report.record(Stage::SeedData, status);

        info!(
            repaired = ?report.repaired_stages(),
            "Environment validated and ready"
        );
        Outcome::Ready(report)
    }

    fn config_stage(&mut self) -> Result<(DbSettings, StageStatus)> {
        info!(stage = %Stage::Config, path = %self.store.path().display(), "Checking stage");
        match &mut self.mode {
            ConfigMode::Strict => Ok((self.store.check()?, StageStatus::Satisfied)),
            ConfigMode::Interactive(prompter) => {
                let ensured = self.store.ensure(&mut **prompter)?;
                let status = if ensured.repaired {
                    StageStatus::Repaired
                } else {
                    StageStatus::Satisfied
                };
                Ok((ensured.settings, status))
            }
        }
    }

    async fn database_stage(&self, settings: &DbSettings) -> Result<StageStatus> {
        info!(stage = %Stage::Database, database = %settings.database, "Checking stage");
        let mut session = self.connector.open_admin(settings).await?;
        let result = ensure_database(&mut session, &settings.database).await;
        release(session).await;
        result
    }

    async fn schema_stage(&self, settings: &DbSettings) -> Result<StageStatus> {
        info!(stage = %Stage::Schema, "Checking stage");
        let mut session = self.connector.open_target(settings).await?;
        let result = self.ensure_schema(&mut session).await;
        release(session).await;
        result
    }

    async fn seed_stage(
        &self,
        settings: &DbSettings,
    ) -> Result<(StageStatus, Option<LoadReport>)> {
        info!(stage = %Stage::SeedData, "Checking stage");
        let mut session = self.connector.open_target(settings).await?;
        let result = self.ensure_seed_data(&mut session).await;
        release(session).await;
        result
    }

    async fn ensure_schema(&self, session: &mut C::Session) -> Result<StageStatus> {
        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
            if !session.table_exists(table).await? {
                missing.push(table);
            }
        }
        if missing.is_empty() {
            info!("Database schema already exists");
            return Ok(StageStatus::Satisfied);
        }

        let path = &self.artifacts.schema_file;
        if !path.exists() {
            return Err(BootstrapError::SchemaFileMissing { path: path.clone() });
        }
        let script =
            fs::read_to_string(path).map_err(|e| BootstrapError::io("read", path, e))?;

        info!(missing = ?missing, script = %path.display(), "Creating database schema");
        session.execute_script(&script).await?;
        Ok(StageStatus::Repaired)
    }

    async fn ensure_seed_data(
        &self,
        session: &mut C::Session,
    ) -> Result<(StageStatus, Option<LoadReport>)> {
        let count = session.count_rows(METADATA_TABLE).await?;
        if count > 0 {
            info!(table = METADATA_TABLE, rows = count, "Seed data already present");
            return Ok((StageStatus::Satisfied, None));
        }

        let path = &self.artifacts.seed_file;
        if !path.exists() {
            return Err(BootstrapError::SeedFileMissing {
                path: path.clone(),
                reason: "file not found".to_string(),
            });
        }
        let table = parse_table(path).map_err(|e| BootstrapError::SeedFileMissing {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!(
            table = METADATA_TABLE,
            source = %path.display(),
            rows = table.rows.len(),
            "Populating seed data"
        );
        let loaded = reload(session, &table).await?;
        if loaded.inserted == 0 {
            warn!(source = %path.display(), "Seed file produced no valid rows");
        }
        Ok((StageStatus::Repaired, Some(loaded)))
    }
}

async fn ensure_database<S: Session>(session: &mut S, name: &str) -> Result<StageStatus> {
    if session.database_exists(name).await? {
        info!(database = %name, "Database already exists");
        return Ok(StageStatus::Satisfied);
    }
    info!(database = %name, "Creating database");
    session.create_database(name).await?;
    Ok(StageStatus::Repaired)
}

/// Close a session on every exit path of a stage.
async fn release<S: Session>(session: S) {
    if let Err(e) = session.close().await {
        warn!(error = %e, "Connection did not close cleanly");
    }
}

fn fail(stage: Stage, error: BootstrapError) -> Outcome {
    error!(stage = %stage, error = %error, "Stage failed");
    Outcome::NotReady(StageFailure { stage, error })
}
