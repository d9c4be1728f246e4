use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::errors::ExperimentError;

/// Rollout parameters for one OAuth client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRolloutConfig {
    pub name: String,
    #[serde(default)]
    pub enable_test_emails: bool,
    /// Candidate groups in order. Falls back to the rule's default groups when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    pub rollout_rate: f64,
}

impl ClientRolloutConfig {
    fn validate(&self, client_id: &str) -> Result<(), ExperimentError> {
        if !self.rollout_rate.is_finite() || !(0.0..=1.0).contains(&self.rollout_rate) {
            return Err(ExperimentError::InvalidRolloutConfig(format!(
                "client {client_id} has rollout rate {} outside [0, 1]",
                self.rollout_rate
            )));
        }

        if let Some(groups) = &self.groups {
            if groups.is_empty() {
                return Err(ExperimentError::InvalidRolloutConfig(format!(
                    "client {client_id} has an empty group list"
                )));
            }
            if groups.iter().any(|g| g.is_empty()) {
                return Err(ExperimentError::InvalidRolloutConfig(format!(
                    "client {client_id} has an empty group name"
                )));
            }
        }

        Ok(())
    }
}

/// Immutable client id -> rollout table, validated once when built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloutClients {
    clients: HashMap<String, ClientRolloutConfig>,
}

impl RolloutClients {
    pub fn new(clients: HashMap<String, ClientRolloutConfig>) -> Result<Self, ExperimentError> {
        for (client_id, config) in &clients {
            config.validate(client_id)?;
        }

        Ok(RolloutClients { clients })
    }

    /// The table shipped with the token code experiment. Every client starts at a zero
    /// rollout; the iOS extension lets internal test accounts in regardless.
    pub fn token_code_defaults() -> Self {
        let clients = [
            (
                "37fdfa37698f251a",
                ClientRolloutConfig {
                    name: "Lockbox Extension".to_string(),
                    enable_test_emails: false,
                    groups: None,
                    rollout_rate: 0.0,
                },
            ),
            (
                "98adfa37698f255b",
                ClientRolloutConfig {
                    name: "Lockbox Extension iOS".to_string(),
                    enable_test_emails: true,
                    groups: Some(vec!["treatment-code".to_string()]),
                    rollout_rate: 0.0,
                },
            ),
            (
                "ecdb5ae7add825d4",
                ClientRolloutConfig {
                    name: "TestClient".to_string(),
                    enable_test_emails: false,
                    groups: None,
                    rollout_rate: 0.0,
                },
            ),
        ];

        RolloutClients {
            clients: clients
                .into_iter()
                .map(|(id, config)| (id.to_string(), config))
                .collect(),
        }
    }

    /// Parses a JSON object keyed by client id.
    pub fn from_json(payload: &str) -> Result<Self, ExperimentError> {
        let clients: HashMap<String, ClientRolloutConfig> = serde_json::from_str(payload)
            .map_err(|e| {
                tracing::error!("failed to parse rollout clients: {}", e);
                ExperimentError::InvalidRolloutConfig(e.to_string())
            })?;

        RolloutClients::new(clients)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, ExperimentError> {
        let payload = std::fs::read_to_string(path)?;
        let clients = RolloutClients::from_json(&payload)?;

        tracing::info!(clients = clients.len(), "loaded rollout clients");
        Ok(clients)
    }

    pub fn get(&self, client_id: &str) -> Option<&ClientRolloutConfig> {
        self.clients.get(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
