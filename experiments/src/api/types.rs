use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::instrument;

use crate::{
    api::errors::ExperimentError,
    flows::landing::{LandingContext, LandingDecision},
    grouping::{registry::ForcedExperiment, rule::Decision, subject::Subject},
};

/// Decodes a JSON request body. Anything that isn't UTF-8 is rejected before serde sees it.
#[instrument(skip_all)]
pub fn decode_json<T: DeserializeOwned>(bytes: Bytes) -> Result<T, ExperimentError> {
    tracing::debug!(len = bytes.len(), "decoding new request");
    let payload = String::from_utf8(bytes.into()).map_err(|e| {
        tracing::error!("failed to decode body: {}", e);
        ExperimentError::RequestDecodingError(String::from("invalid body encoding"))
    })?;

    Ok(serde_json::from_str::<T>(&payload)?)
}

/// Subject fields at the top level, plus the `forceExperiment` query params the page was opened with.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentsRequest {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_experiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_experiment_group: Option<String>,
}

impl ExperimentsRequest {
    pub fn from_bytes(bytes: Bytes) -> Result<ExperimentsRequest, ExperimentError> {
        decode_json(bytes)
    }

    pub fn forced(&self) -> Option<ForcedExperiment> {
        forced_experiment(&self.force_experiment, &self.force_experiment_group)
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingRequest {
    #[serde(flatten)]
    pub context: LandingContext,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_experiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_experiment_group: Option<String>,
}

impl LandingRequest {
    pub fn from_bytes(bytes: Bytes) -> Result<LandingRequest, ExperimentError> {
        decode_json(bytes)
    }

    pub fn forced(&self) -> Option<ForcedExperiment> {
        forced_experiment(&self.force_experiment, &self.force_experiment_group)
    }
}

fn forced_experiment(
    experiment: &Option<String>,
    group: &Option<String>,
) -> Option<ForcedExperiment> {
    match (experiment, group) {
        (Some(experiment), Some(group)) => Some(ForcedExperiment {
            experiment: experiment.clone(),
            group: group.clone(),
        }),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExperimentsResponse {
    pub experiments: BTreeMap<String, Decision>,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExperimentResponse {
    pub experiment: String,
    pub group: Decision,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    /// The email-first group the decision was made under.
    pub email_first: Decision,
    #[serde(flatten)]
    pub decision: LandingDecision,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteQueryParams {
    #[serde(default)]
    pub fragment: String,
    #[serde(default)]
    pub email_first_flow: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BrokerResponse {
    pub context: String,
    pub broker: &'static str,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RelierResponse {
    pub name: String,
    pub relier: &'static str,
}
