//! Host event protocol
//!
//! The host runtime runs the plugin as `provider-rke2 <event>` with an event
//! on stdin and reads one JSON response from stdout:
//!
//! ```json
//! {"name": "cluster.provision", "data": "{\"config\": \"cluster: ...\"}", "file": ""}
//! ```
//!
//! Event-level failures are reported through the response `error` field,
//! not the exit status.

use std::io::{self, Read};

use rke2_provider::{ConfigEmitter, InterfaceProbe, NodeConfig};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CLUSTER_PROVISION: &str = "cluster.provision";
pub const CLUSTER_RESET: &str = "cluster.reset";

/// Event as delivered on stdin
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Event {
    #[serde(default)]
    pub name: String,
    /// JSON-encoded payload
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub file: String,
}

/// Payload of the provisioning event
#[derive(Debug, Default, Deserialize)]
struct BootPayload {
    /// The node's cloud-config as YAML text
    #[serde(default)]
    config: String,
}

/// Reply written to stdout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventResponse {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub logs: String,
}

impl EventResponse {
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Dispatch one event. Never fails; errors land in the response.
pub fn handle_event<P: InterfaceProbe>(
    name: &str,
    input: &str,
    emitter: &ConfigEmitter<P>,
) -> EventResponse {
    match name {
        CLUSTER_PROVISION => match provision(input, emitter) {
            Ok(plan) => EventResponse::with_data(plan),
            Err(e) => {
                tracing::error!(error = %e, "Provisioning event failed");
                EventResponse::failed(e.to_string())
            }
        },
        CLUSTER_RESET => {
            tracing::info!("Cluster reset requested, cleanup is left to the host");
            EventResponse::default()
        }
        other => {
            tracing::warn!(event = other, "Ignoring unknown event");
            EventResponse::failed(format!("unknown event {other}"))
        }
    }
}

fn provision<P: InterfaceProbe>(input: &str, emitter: &ConfigEmitter<P>) -> Result<String> {
    let event: Event = serde_json::from_str(input)?;
    tracing::debug!(event = %event.name, file = %event.file, "Received event");

    let payload: BootPayload = if event.data.trim().is_empty() {
        BootPayload::default()
    } else {
        serde_json::from_str(&event.data)?
    };

    let Some(cluster) = NodeConfig::from_yaml(&payload.config)?.cluster else {
        tracing::info!("No cluster section in node config, nothing to provision");
        return Ok(String::new());
    };

    Ok(emitter.build_plan(&cluster).to_yaml()?)
}

/// Read the event from stdin, handle it, write the response to stdout.
pub fn run_event(name: &str) -> Result<()> {
    // The host writes the whole event before reading the reply
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let response = handle_event(name, &input, &ConfigEmitter::new());
    tracing::debug!(event = name, failed = response.is_error(), "Writing event response");
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
