//! Operator-facing reporting of a finished run

use super::stage::Outcome;
use common::{SetupEvent, Telemetry};
use std::time::Instant;
use tracing::warn;

/// Send telemetry for `outcome` and print the diagnosis on failure.
pub fn announce(outcome: &Outcome, telemetry: &Telemetry, started: Instant) {
    match outcome {
        Outcome::Ready(report) => {
            for stage in report.repaired_stages() {
                telemetry.send(SetupEvent::StageRepaired {
                    stage: stage.to_string(),
                    detail: format!("database {}", report.settings.database),
                });
            }
            if let Some(seed) = report.seed {
                telemetry.send(SetupEvent::SeedLoaded {
                    inserted: seed.inserted,
                    skipped: seed.skipped,
                    failed: seed.failed,
                });
            }
            deliver(
                telemetry,
                SetupEvent::BootstrapCompleted {
                    duration_ms: started.elapsed().as_millis() as u64,
                    repaired: report
                        .repaired_stages()
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                },
            );
        }
        Outcome::NotReady(failure) => {
            deliver(
                telemetry,
                SetupEvent::BootstrapFailed {
                    stage: failure.stage.to_string(),
                    error: failure.error.to_string(),
                },
            );
            eprintln!();
            eprintln!("Environment is not ready: {}", failure);
            eprintln!("{}", failure.remediation());
        }
    }
}

/// Blocking send of the final event; a failed POST is logged, never fatal.
fn deliver(telemetry: &Telemetry, event: SetupEvent) -> bool {
    match telemetry.send_sync(event) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Telemetry send failed");
            false
        }
    }
}
