//! Connection seam
//!
//! Stages only ever talk to the database through these traits, so they can
//! run against an in-memory server in tests.

use crate::error::Result;
use crate::ingest::ColumnRecord;
use crate::settings::DbSettings;

/// One open, autocommit connection. Every statement takes effect immediately.
#[allow(async_fn_in_trait)]
pub trait Session {
    async fn database_exists(&mut self, name: &str) -> Result<bool>;

    /// Must run outside a transaction block.
    async fn create_database(&mut self, name: &str) -> Result<()>;

    async fn table_exists(&mut self, table: &str) -> Result<bool>;

    /// Run a multi-statement script as-is.
    async fn execute_script(&mut self, sql: &str) -> Result<()>;

    async fn count_rows(&mut self, table: &str) -> Result<i64>;

    /// Delete all rows and restart the id sequence at 1.
    async fn reset_table(&mut self, table: &str, sequence: &str) -> Result<()>;

    async fn insert_column(&mut self, record: &ColumnRecord) -> Result<()>;

    /// Release the connection. Dropping a session also releases it.
    async fn close(self) -> Result<()>;
}

/// Opens sessions; never retries.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Session: Session;

    /// Connect to the server's always-present administrative database.
    async fn open_admin(&self, settings: &DbSettings) -> Result<Self::Session>;

    /// Connect to `settings.database`, once it is known to exist.
    async fn open_target(&self, settings: &DbSettings) -> Result<Self::Session>;
}
