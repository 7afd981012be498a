//! Config store accessor
//!
//! Verifies the live config file, creating it from the template and
//! repairing it interactively when required settings are absent.

use super::file::ConfigFile;
use super::keys::{
    RequiredKey, PASSWORD_PLACEHOLDER, PG_DATABASE, PG_HOST, PG_PASSWORD, PG_PORT, PG_USER,
    REQUIRED_KEYS,
};
use super::prompt::Prompter;
use crate::error::{BootstrapError, Result};
use common::SetupEnv;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Validated connection parameters, passed explicitly to every component.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .finish()
    }
}

impl DbSettings {
    /// Build settings from a config file. Every required key must hold a value.
    pub fn from_file(file: &ConfigFile) -> Result<Self> {
        let require = |name: &str| -> Result<String> {
            REQUIRED_KEYS
                .iter()
                .find(|k| k.name == name)
                .and_then(|k| current_value(file, k))
                .ok_or_else(|| BootstrapError::ConfigIncomplete {
                    key: name.to_string(),
                })
        };

        let port_raw = require(PG_PORT)?;
        let port = port_raw
            .parse::<u16>()
            .map_err(|e| BootstrapError::ConfigInvalid {
                key: PG_PORT.to_string(),
                value: port_raw.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            host: require(PG_HOST)?,
            port,
            user: require(PG_USER)?,
            password: require(PG_PASSWORD)?,
            database: require(PG_DATABASE)?,
        })
    }
}

/// Current usable value of a key, if any.
fn current_value(file: &ConfigFile, key: &RequiredKey) -> Option<String> {
    file.get(key.name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter(|v| !(key.secret && *v == PASSWORD_PLACEHOLDER))
        .map(str::to_string)
}

/// Required keys that have no usable value.
pub fn missing_keys(file: &ConfigFile) -> Vec<&'static str> {
    REQUIRED_KEYS
        .iter()
        .filter(|k| current_value(file, k).is_none())
        .map(|k| k.name)
        .collect()
}

/// One question of the repair flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPrompt {
    pub key: RequiredKey,
    pub current: Option<String>,
    pub prompt: String,
}

/// Every question the repair flow asks, derived purely from file state.
///
/// All required keys are always asked, with the current value as default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairPlan {
    pub prompts: Vec<PlannedPrompt>,
}

impl RepairPlan {
    pub fn for_file(file: &ConfigFile) -> Self {
        let prompts = REQUIRED_KEYS
            .iter()
            .map(|key| {
                let current = current_value(file, key);
                let prompt = match (&current, key.secret) {
                    (Some(_), true) => format!("{} [****]: ", key.description),
                    (Some(value), false) => format!("{} [{}]: ", key.description, value),
                    (None, _) => format!("{}: ", key.description),
                };
                PlannedPrompt {
                    key: *key,
                    current,
                    prompt,
                }
            })
            .collect();

        Self { prompts }
    }

    /// Ask every question, then apply all answers. Nothing is applied if any
    /// required key ends up without a value.
    pub fn apply(&self, file: &mut ConfigFile, prompter: &mut dyn Prompter) -> Result<()> {
        let mut answers = Vec::with_capacity(self.prompts.len());
        for planned in &self.prompts {
            let answer = prompter
                .ask(&planned.prompt)
                .map_err(|e| BootstrapError::io("read answer from", "stdin", e))?;

            let value = if !answer.is_empty() {
                answer
            } else if let Some(current) = &planned.current {
                current.clone()
            } else {
                prompter.notice(&format!("{} is required.", planned.key.description));
                return Err(BootstrapError::ConfigIncomplete {
                    key: planned.key.name.to_string(),
                });
            };
            answers.push((planned.key.name, value));
        }

        for (name, value) in answers {
            file.set(name, value);
        }
        Ok(())
    }
}

/// Result of a successful `ConfigStore::ensure`.
#[derive(Debug, Clone)]
pub struct EnsuredConfig {
    pub settings: DbSettings,
    /// Whether the file was created or rewritten during this call.
    pub repaired: bool,
}

/// Accessor for the live config file and its template.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    template: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template: template.into(),
        }
    }

    /// Store located via `SETUP_ENV_FILE` / `SETUP_ENV_TEMPLATE`.
    pub fn from_env() -> Self {
        Self::new(SetupEnv::env_file(), SetupEnv::env_template())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate without any side effect: no copying, no prompting.
    pub fn check(&self) -> Result<DbSettings> {
        if !self.path.exists() {
            return Err(self.missing());
        }
        let file = ConfigFile::load(&self.path)?;
        let missing = missing_keys(&file);
        if let Some(first) = missing.first() {
            warn!(path = %self.path.display(), missing = ?missing, "Config file incomplete");
            return Err(BootstrapError::ConfigIncomplete {
                key: first.to_string(),
            });
        }
        DbSettings::from_file(&file)
    }

    /// Make sure the config file exists and is complete, repairing it through
    /// `prompter` when it is not.
    pub fn ensure(&self, prompter: &mut dyn Prompter) -> Result<EnsuredConfig> {
        let file = if self.path.exists() {
            info!(path = %self.path.display(), "Config file found");
            let file = ConfigFile::load(&self.path)?;
            let missing = missing_keys(&file);

            if missing.is_empty() {
                match DbSettings::from_file(&file) {
                    Ok(settings) => {
                        return Ok(EnsuredConfig {
                            settings,
                            repaired: false,
                        })
                    }
                    Err(e) => warn!(error = %e, "Config file has an invalid value"),
                }
            } else {
                warn!(missing = ?missing, "Config file is missing settings");
                prompter.notice(&format!("Missing settings: {}", missing.join(", ")));
            }
            file
        } else {
            if !self.template.exists() {
                return Err(self.missing());
            }
            info!(
                template = %self.template.display(),
                path = %self.path.display(),
                "Creating config file from template"
            );
            fs::copy(&self.template, &self.path)
                .map_err(|e| BootstrapError::io("copy template to", &self.path, e))?;
            ConfigFile::load(&self.path)?
        };

        let settings = self.repair(file, prompter)?;
        Ok(EnsuredConfig {
            settings,
            repaired: true,
        })
    }

    fn repair(&self, mut file: ConfigFile, prompter: &mut dyn Prompter) -> Result<DbSettings> {
        prompter.notice("Configuring database settings.");
        prompter.notice("Press Enter to keep the current value shown in [brackets].");

        RepairPlan::for_file(&file).apply(&mut file, prompter)?;

        // Validate before touching the file so a bad answer writes nothing
        let settings = DbSettings::from_file(&file)?;
        file.save(&self.path)?;

        info!(path = %self.path.display(), "Config file saved");
        prompter.notice(&format!("Settings saved to {}", self.path.display()));
        Ok(settings)
    }

    fn missing(&self) -> BootstrapError {
        BootstrapError::ConfigMissing {
            path: self.path.clone(),
            template: self.template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ScriptedPrompter;

    const COMPLETE: &str = "PG_HOST = \"localhost\"\nPG_PORT = \"5432\"\nPG_USER = \"admin\"\nPG_PASSWORD = \"s3cret\"\nPG_DATABASE = \"mylib\"\n";

    fn store_in(dir: &Path) -> ConfigStore {
        ConfigStore::new(dir.join(".env"), dir.join("example.env"))
    }

    #[test]
    fn test_complete_file_needs_no_prompt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), COMPLETE).unwrap();
        let mut prompter = ScriptedPrompter::default();

        let ensured = store_in(dir.path()).ensure(&mut prompter).unwrap();

        assert!(!ensured.repaired);
        assert_eq!(ensured.settings.port, 5432);
        assert_eq!(ensured.settings.database, "mylib");
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_missing_file_without_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut prompter = ScriptedPrompter::default();

        let err = store_in(dir.path()).ensure(&mut prompter).unwrap_err();

        assert!(matches!(err, BootstrapError::ConfigMissing { .. }));
        assert!(!dir.path().join(".env").exists());
    }

    #[test]
    fn test_missing_key_repair_then_second_ensure_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let without_db = COMPLETE.replace("PG_DATABASE = \"mylib\"\n", "");
        fs::write(dir.path().join(".env"), without_db).unwrap();
        let store = store_in(dir.path());

        // keep host, port, user, password; supply the database
        let mut prompter = ScriptedPrompter::new(["", "", "", "", "catalog"]);
        let ensured = store.ensure(&mut prompter).unwrap();

        assert!(ensured.repaired);
        assert_eq!(prompter.asked.len(), 5);
        assert_eq!(prompter.asked[0], "PostgreSQL host [localhost]: ");
        assert_eq!(prompter.asked[3], "PostgreSQL password [****]: ");
        assert_eq!(prompter.asked[4], "Database name: ");

        let file = ConfigFile::load(&dir.path().join(".env")).unwrap();
        assert!(missing_keys(&file).is_empty());
        assert_eq!(file.get("PG_DATABASE"), Some("catalog"));

        let mut silent = ScriptedPrompter::default();
        let again = store.ensure(&mut silent).unwrap();
        assert!(!again.repaired);
        assert!(silent.asked.is_empty());
        assert_eq!(again.settings, ensured.settings);
    }

    #[test]
    fn test_template_is_copied_and_placeholder_password_must_be_answered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("example.env"),
            COMPLETE.replace("s3cret", PASSWORD_PLACEHOLDER),
        )
        .unwrap();
        let store = store_in(dir.path());

        let mut declined = ScriptedPrompter::new(["", "", "", "", ""]);
        let err = store.ensure(&mut declined).unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::ConfigIncomplete { ref key } if key == "PG_PASSWORD"
        ));
        // Template copy happened; the failed repair wrote nothing else
        let copied = ConfigFile::load(&dir.path().join(".env")).unwrap();
        assert_eq!(copied.get("PG_PASSWORD"), Some(PASSWORD_PLACEHOLDER));

        let mut answered = ScriptedPrompter::new(["", "", "", "hunter2", ""]);
        let ensured = store.ensure(&mut answered).unwrap();
        assert_eq!(ensured.settings.password, "hunter2");
        assert_eq!(answered.asked[3], "PostgreSQL password: ");
    }

    #[test]
    fn test_invalid_port_answer_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let original = COMPLETE.replace("PG_HOST = \"localhost\"\n", "");
        fs::write(&path, &original).unwrap();

        let mut prompter = ScriptedPrompter::new(["db", "not-a-port"]);
        let err = store_in(dir.path()).ensure(&mut prompter).unwrap_err();

        assert!(matches!(err, BootstrapError::ConfigInvalid { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_check_reports_first_missing_key_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "PG_HOST=\"db\"\n").unwrap();

        let err = store_in(dir.path()).check().unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::ConfigIncomplete { ref key } if key == "PG_PORT"
        ));
    }

    #[test]
    fn test_debug_masks_password() {
        let file = ConfigFile::parse(COMPLETE);
        let settings = DbSettings::from_file(&file).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("s3cret"));
    }
}
