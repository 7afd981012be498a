//! Standalone column metadata reload
//!
//! Parses the column table and replaces the contents of `metadata_columnas`
//! with it, whether or not the table already has rows. Uses the existing
//! config file as-is and never prompts.

use anyhow::{Context, Result};
use common::init_logging;
use library_setup::{parse_table, reload, ConfigStore, Connector, PgConnector, Session, SetupEnv};
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

fn main() -> Result<()> {
    let _guard = init_logging("reload-columns");

    // An explicit path argument wins over SETUP_SEED_FILE
    let seed_file = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(SetupEnv::seed_file);

    let settings = ConfigStore::from_env()
        .check()
        .context("Config file is not usable; run `bootstrap` first")?;

    let table = parse_table(&seed_file)
        .with_context(|| format!("Failed to read column table {}", seed_file.display()))?;
    info!(
        source = %seed_file.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Column table parsed"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let loaded = runtime.block_on(async {
        let connector = PgConnector::from_env();
        let mut session = connector.open_target(&settings).await?;
        let result = reload(&mut session, &table).await;
        if let Err(e) = session.close().await {
            error!(error = %e, "Connection did not close cleanly");
        }
        result
    });
    let loaded = loaded.context("Column metadata reload failed")?;

    println!("Headers: {}", table.headers.join(" | "));
    println!("Rows parsed: {}", table.rows.len());
    println!(
        "Inserted: {}  Skipped: {}  Failed: {}",
        loaded.inserted, loaded.skipped, loaded.failed
    );
    Ok(())
}
