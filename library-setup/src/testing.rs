//! In-memory database server for tests
//!
//! Models just enough of PostgreSQL for the setup stages: databases, the
//! required tables, the metadata rows with their id sequence, and a log of
//! every mutating statement.

use crate::db::{Connector, Session, METADATA_TABLE, REQUIRED_TABLES};
use crate::error::{BootstrapError, Result};
use crate::ingest::ColumnRecord;
use crate::settings::DbSettings;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

const ADMIN_DATABASE: &str = "postgres";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub id: i64,
    pub record: ColumnRecord,
}

#[derive(Debug, Default)]
struct State {
    target: String,
    databases: BTreeSet<String>,
    tables: BTreeSet<String>,
    metadata: Vec<MetadataRow>,
    next_id: i64,
    unreachable: bool,
    fail_script: bool,
    fail_reset: bool,
    rejected_names: Vec<String>,
    mutations: Vec<String>,
    open_sessions: usize,
    opened_total: usize,
}

/// Shared handle; clones see the same server.
#[derive(Debug, Clone)]
pub struct FakeServer {
    state: Rc<RefCell<State>>,
}

impl FakeServer {
    /// Only the admin database exists.
    pub fn empty(target: &str) -> Self {
        let mut databases = BTreeSet::new();
        databases.insert(ADMIN_DATABASE.to_string());
        Self {
            state: Rc::new(RefCell::new(State {
                target: target.to_string(),
                databases,
                next_id: 1,
                ..State::default()
            })),
        }
    }

    /// Target database exists but has no tables.
    pub fn with_database(target: &str) -> Self {
        let server = Self::empty(target);
        server.state.borrow_mut().databases.insert(target.to_string());
        server
    }

    /// Target database and every required table exist; metadata is empty.
    pub fn with_schema(target: &str) -> Self {
        let server = Self::with_database(target);
        server
            .state
            .borrow_mut()
            .tables
            .extend(REQUIRED_TABLES.iter().map(|t| t.to_string()));
        server
    }

    pub fn settings(&self) -> DbSettings {
        DbSettings {
            host: "localhost".to_string(),
            port: 5432,
            user: "admin".to_string(),
            password: "s3cret".to_string(),
            database: self.state.borrow().target.clone(),
        }
    }

    /// Insert rows directly, bypassing the mutation log.
    pub fn seed_metadata(&self, names: &[&str]) {
        let mut state = self.state.borrow_mut();
        for (i, name) in names.iter().enumerate() {
            let id = state.next_id;
            state.next_id += 1;
            state.metadata.push(MetadataRow {
                id,
                record: ColumnRecord {
                    ordinal: i as i32 + 1,
                    name: name.to_string(),
                    explanation: String::new(),
                    format: String::new(),
                    fixed_value: String::new(),
                    desired_language: String::new(),
                    backup_source_id: String::new(),
                    max_length: None,
                },
            });
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.borrow_mut().unreachable = unreachable;
    }

    pub fn fail_scripts(&self) {
        self.state.borrow_mut().fail_script = true;
    }

    pub fn fail_reset(&self) {
        self.state.borrow_mut().fail_reset = true;
    }

    pub fn reject_insert_of(&self, name: &str) {
        self.state.borrow_mut().rejected_names.push(name.to_string());
    }

    pub fn drop_table(&self, table: &str) {
        self.state.borrow_mut().tables.remove(table);
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.state.borrow().databases.contains(name)
    }

    pub fn metadata_rows(&self) -> Vec<MetadataRow> {
        self.state.borrow().metadata.clone()
    }

    /// Every mutating statement, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.state.borrow().mutations.clone()
    }

    pub fn open_sessions(&self) -> usize {
        self.state.borrow().open_sessions
    }

    pub fn opened_total(&self) -> usize {
        self.state.borrow().opened_total
    }
}

#[derive(Debug, Clone)]
pub struct FakeConnector {
    server: FakeServer,
}

impl FakeConnector {
    pub fn new(server: FakeServer) -> Self {
        Self { server }
    }

    fn open(&self, database: &str) -> Result<FakeSession> {
        let mut state = self.server.state.borrow_mut();
        if state.unreachable {
            return Err(BootstrapError::Connection {
                database: database.to_string(),
                source: "connection refused".into(),
            });
        }
        if !state.databases.contains(database) {
            return Err(BootstrapError::Connection {
                database: database.to_string(),
                source: format!("database \"{}\" does not exist", database).into(),
            });
        }
        state.open_sessions += 1;
        state.opened_total += 1;
        Ok(FakeSession {
            server: self.server.clone(),
            database: database.to_string(),
        })
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn open_admin(&self, _settings: &DbSettings) -> Result<FakeSession> {
        self.open(ADMIN_DATABASE)
    }

    async fn open_target(&self, settings: &DbSettings) -> Result<FakeSession> {
        self.open(&settings.database)
    }
}

pub struct FakeSession {
    server: FakeServer,
    database: String,
}

impl FakeSession {
    fn state(&self) -> std::cell::RefMut<'_, State> {
        self.server.state.borrow_mut()
    }

    fn on_target(&self) -> bool {
        self.database == self.server.state.borrow().target
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.state().open_sessions -= 1;
    }
}

impl Session for FakeSession {
    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        Ok(self.state().databases.contains(name))
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        let mut state = self.state();
        if !state.databases.insert(name.to_string()) {
            return Err(BootstrapError::query(
                format!("create database {}", name),
                "database already exists",
            ));
        }
        state.mutations.push(format!("create database {}", name));
        Ok(())
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        Ok(self.on_target() && self.state().tables.contains(table))
    }

    async fn execute_script(&mut self, sql: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_script {
            return Err(BootstrapError::query(
                "execute schema script",
                "syntax error at or near \"CREAT\"",
            ));
        }
        state.mutations.push("execute script".to_string());
        if sql.contains("CREATE TABLE") {
            state
                .tables
                .extend(REQUIRED_TABLES.iter().map(|t| t.to_string()));
        }
        Ok(())
    }

    async fn count_rows(&mut self, table: &str) -> Result<i64> {
        let state = self.state();
        if !state.tables.contains(table) {
            return Err(BootstrapError::query(
                format!("count rows in {}", table),
                format!("relation \"{}\" does not exist", table),
            ));
        }
        if table == METADATA_TABLE {
            Ok(state.metadata.len() as i64)
        } else {
            Ok(0)
        }
    }

    async fn reset_table(&mut self, table: &str, sequence: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_reset {
            return Err(BootstrapError::query(
                format!("restart {}", sequence),
                format!("must be owner of sequence {}", sequence),
            ));
        }
        state.metadata.clear();
        state.next_id = 1;
        state.mutations.push(format!("reset {} {}", table, sequence));
        Ok(())
    }

    async fn insert_column(&mut self, record: &ColumnRecord) -> Result<()> {
        let mut state = self.state();
        if state.rejected_names.contains(&record.name) {
            return Err(BootstrapError::query(
                format!("insert column {}", record.ordinal),
                "value too long for type character varying(50)",
            ));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.metadata.push(MetadataRow {
            id,
            record: record.clone(),
        });
        state.mutations.push(format!("insert {}", record.ordinal));
        Ok(())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
