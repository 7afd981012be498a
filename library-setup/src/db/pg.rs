//! PostgreSQL sessions over sqlx
//!
//! A bare `PgConnection` (no pool) runs every statement in autocommit mode,
//! which CREATE DATABASE requires.

use super::session::{Connector, Session};
use crate::error::{BootstrapError, Result};
use crate::ingest::ColumnRecord;
use crate::settings::DbSettings;
use common::SetupEnv;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::debug;

const INSERT_COLUMN: &str = "INSERT INTO metadata_columnas \
     (nro_columna, columna, explicacion, formato, dato_fijo, idioma_deseado_redactar, id_from_backup, max) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

/// Quote an identifier for interpolation into DDL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Opens sqlx connections from explicit settings.
#[derive(Debug, Clone)]
pub struct PgConnector {
    admin_database: String,
}

impl PgConnector {
    pub fn new(admin_database: impl Into<String>) -> Self {
        Self {
            admin_database: admin_database.into(),
        }
    }

    /// Connector whose admin database comes from `SETUP_ADMIN_DATABASE`.
    pub fn from_env() -> Self {
        Self::new(SetupEnv::admin_database())
    }

    async fn connect(&self, settings: &DbSettings, database: &str) -> Result<PgSession> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(database);

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| BootstrapError::Connection {
                database: database.to_string(),
                source: e.into(),
            })?;

        debug!(host = %settings.host, port = settings.port, database, "Connected");
        Ok(PgSession {
            conn,
            database: database.to_string(),
        })
    }
}

impl Connector for PgConnector {
    type Session = PgSession;

    async fn open_admin(&self, settings: &DbSettings) -> Result<PgSession> {
        self.connect(settings, &self.admin_database).await
    }

    async fn open_target(&self, settings: &DbSettings) -> Result<PgSession> {
        self.connect(settings, &settings.database).await
    }
}

/// A live connection to one database.
pub struct PgSession {
    conn: PgConnection,
    database: String,
}

impl Session for PgSession {
    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1")
                .bind(name)
                .fetch_optional(&mut self.conn)
                .await
                .map_err(|e| BootstrapError::query("check database existence", e))?;
        Ok(found.is_some())
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        let sql = format!("CREATE DATABASE {}", quote_ident(name));
        sqlx::raw_sql(&sql)
            .execute(&mut self.conn)
            .await
            .map_err(|e| BootstrapError::query(format!("create database {}", name), e))?;
        Ok(())
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&mut self.conn)
        .await
        .map_err(|e| BootstrapError::query(format!("check table {}", table), e))
    }

    async fn execute_script(&mut self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql)
            .execute(&mut self.conn)
            .await
            .map_err(|e| BootstrapError::query("execute schema script", e))?;
        Ok(())
    }

    async fn count_rows(&mut self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        sqlx::query_scalar(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| BootstrapError::query(format!("count rows in {}", table), e))
    }

    async fn reset_table(&mut self, table: &str, sequence: &str) -> Result<()> {
        let delete = format!("DELETE FROM {}", quote_ident(table));
        sqlx::query(&delete)
            .execute(&mut self.conn)
            .await
            .map_err(|e| BootstrapError::query(format!("clear {}", table), e))?;

        let restart = format!("ALTER SEQUENCE {} RESTART WITH 1", quote_ident(sequence));
        sqlx::query(&restart)
            .execute(&mut self.conn)
            .await
            .map_err(|e| BootstrapError::query(format!("restart {}", sequence), e))?;
        Ok(())
    }

    async fn insert_column(&mut self, record: &ColumnRecord) -> Result<()> {
        sqlx::query(INSERT_COLUMN)
            .bind(record.ordinal)
            .bind(&record.name)
            .bind(&record.explanation)
            .bind(&record.format)
            .bind(&record.fixed_value)
            .bind(&record.desired_language)
            .bind(&record.backup_source_id)
            .bind(record.max_length)
            .execute(&mut self.conn)
            .await
            .map_err(|e| BootstrapError::query(format!("insert column {}", record.ordinal), e))?;
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| BootstrapError::query(format!("close connection to {}", self.database), e))
    }
}
