//! Bootstrap launcher
//!
//! Validates the environment stage by stage, prompting the operator for any
//! missing database settings. Once everything is ready it replaces itself
//! with the serving command given after `--`, if any:
//!
//! ```text
//! bootstrap -- gunicorn app:create_app()
//! ```

use anyhow::{anyhow, Context, Result};
use common::{init_logging, SetupEvent, Telemetry};
use library_setup::bootstrap::announce;
use library_setup::{Artifacts, ConfigStore, PgConnector, Sequencer, StdinPrompter};
use std::env;
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::time::Instant;
use tracing::info;

fn serve_command() -> Vec<String> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.first().is_some_and(|a| a == "--") {
        args.remove(0);
    }
    args
}

fn main() -> Result<()> {
    let _guard = init_logging("bootstrap");

    let started = Instant::now();
    let telemetry = Telemetry::from_env("bootstrap");
    let store = ConfigStore::from_env();
    let serve = serve_command();

    telemetry.send(SetupEvent::BootstrapStarted {
        config: store.path().display().to_string(),
        interactive: true,
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut prompter = StdinPrompter;
    let outcome = runtime.block_on(async {
        let mut sequencer = Sequencer::new(store, PgConnector::from_env(), Artifacts::from_env())
            .interactive(&mut prompter);
        sequencer.run().await
    });
    drop(runtime);

    announce(&outcome, &telemetry, started);
    if !outcome.is_ready() {
        std::process::exit(1);
    }

    let Some((program, args)) = serve.split_first() else {
        println!("Environment ready. Start the web server when you are.");
        return Ok(());
    };

    info!(command = %program, "Starting server");

    // exec only returns if there was an error
    let err = Command::new(program).args(args).exec();
    Err(anyhow!("Failed to exec {}: {}", program, err))
}
