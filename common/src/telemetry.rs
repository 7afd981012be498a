//! Telemetry for setup events
//!
//! Every event is logged locally. When `SETUP_TELEMETRY_ENDPOINT` is set the
//! event is also posted there as JSON, fire and forget.

use crate::config::SetupEnv;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// All events a setup run can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SetupEvent {
    /// Sequencer started
    BootstrapStarted { config: String, interactive: bool },

    /// A stage found its precondition false and repaired it
    StageRepaired { stage: String, detail: String },

    /// Column metadata was (re)loaded from the seed file
    SeedLoaded {
        inserted: usize,
        skipped: usize,
        failed: usize,
    },

    /// All stages passed
    BootstrapCompleted {
        duration_ms: u64,
        repaired: Vec<String>,
    },

    /// A stage failed and the run stopped there
    BootstrapFailed { stage: String, error: String },
}

impl SetupEvent {
    /// Get the event type name for logging and the remote sink.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::BootstrapStarted { .. } => "SETUP_BOOTSTRAP_STARTED",
            Self::StageRepaired { .. } => "SETUP_STAGE_REPAIRED",
            Self::SeedLoaded { .. } => "SETUP_SEED_LOADED",
            Self::BootstrapCompleted { .. } => "SETUP_BOOTSTRAP_COMPLETED",
            Self::BootstrapFailed { .. } => "SETUP_BOOTSTRAP_FAILED",
        }
    }

    /// Convert event to a human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::BootstrapStarted {
                config,
                interactive,
            } => {
                format!(
                    "Bootstrap started with {} (interactive={})",
                    config, interactive
                )
            }
            Self::StageRepaired { stage, detail } => format!("{} repaired: {}", stage, detail),
            Self::SeedLoaded {
                inserted,
                skipped,
                failed,
            } => {
                format!(
                    "Seed data loaded ({} inserted, {} skipped, {} failed)",
                    inserted, skipped, failed
                )
            }
            Self::BootstrapCompleted {
                duration_ms,
                repaired,
            } => {
                if repaired.is_empty() {
                    format!("Environment already ready ({}ms)", duration_ms)
                } else {
                    format!(
                        "Environment ready in {}ms (repaired: {})",
                        duration_ms,
                        repaired.join(", ")
                    )
                }
            }
            Self::BootstrapFailed { stage, error } => {
                format!("Bootstrap failed during {}: {}", stage, error)
            }
        }
    }
}

/// Telemetry client for setup events.
#[derive(Clone)]
pub struct Telemetry {
    client: Option<Arc<Client>>,
    endpoint: Option<String>,
    component: String,
}

impl Telemetry {
    /// Create a new telemetry client from environment variables.
    pub fn from_env(component: &str) -> Self {
        Self::new(component, SetupEnv::telemetry_endpoint())
    }

    /// Create a client posting to `endpoint`, or a log-only client for `None`.
    pub fn new(component: &str, endpoint: Option<String>) -> Self {
        let client = endpoint.as_ref().map(|_| {
            Arc::new(
                Client::builder()
                    .timeout(Duration::from_secs(5))
                    .build()
                    .unwrap_or_else(|_| Client::new()),
            )
        });

        Self {
            client,
            endpoint,
            component: component.to_string(),
        }
    }

    fn payload(&self, event: &SetupEvent) -> serde_json::Value {
        json!({
            "component": self.component,
            "event": event.event_type(),
            "message": event.message(),
            "data": event,
        })
    }

    /// Send an event (fire and forget, non-blocking).
    ///
    /// Errors are logged but do not affect the caller.
    pub fn send(&self, event: SetupEvent) {
        info!(event = %event.event_type(), "{}", event.message());

        let (Some(client), Some(endpoint)) = (self.client.clone(), self.endpoint.clone()) else {
            return;
        };
        let payload = self.payload(&event);

        thread::spawn(move || match client.post(&endpoint).json(&payload).send() {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                warn!("Telemetry got status {}", resp.status());
            }
            Err(e) => {
                warn!("Telemetry send failed: {}", e);
            }
        });
    }

    /// Send an event synchronously (blocking).
    ///
    /// Use this right before the process exits so the event is not lost.
    pub fn send_sync(&self, event: SetupEvent) -> Result<(), reqwest::Error> {
        info!(event = %event.event_type(), "{}", event.message());

        if let (Some(client), Some(endpoint)) = (&self.client, &self.endpoint) {
            client.post(endpoint).json(&self.payload(&event)).send()?;
        }

        Ok(())
    }
}
