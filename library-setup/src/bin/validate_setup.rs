//! Non-interactive environment check
//!
//! Runs the same four stages as `bootstrap` but never prompts: a missing or
//! incomplete config file is reported, not repaired. Suitable for CI and
//! container health gates.

use anyhow::{Context, Result};
use common::{init_logging, SetupEvent, Telemetry};
use library_setup::bootstrap::announce;
use library_setup::{Artifacts, ConfigStore, PgConnector, Sequencer};
use std::time::Instant;

fn main() -> Result<()> {
    let _guard = init_logging("validate-setup");

    let started = Instant::now();
    let telemetry = Telemetry::from_env("validate-setup");
    let store = ConfigStore::from_env();

    telemetry.send(SetupEvent::BootstrapStarted {
        config: store.path().display().to_string(),
        interactive: false,
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let outcome = runtime.block_on(async {
        let mut sequencer =
            Sequencer::new(store, PgConnector::from_env(), Artifacts::from_env()).strict();
        sequencer.run().await
    });
    drop(runtime);

    announce(&outcome, &telemetry, started);
    if !outcome.is_ready() {
        std::process::exit(1);
    }
    println!("Environment ready to start the application.");
    Ok(())
}
