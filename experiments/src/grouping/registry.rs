use std::{collections::BTreeMap, sync::Arc};

use metrics::counter;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;

use crate::{
    api::errors::ExperimentError,
    config::Config,
    grouping::{
        email_first::EmailFirstGroupingRule,
        rollout_config::RolloutClients,
        rule::{Decision, GroupingRule, TestEmailMatcher},
        subject::Subject,
        token_code::TokenCodeGroupingRule,
    },
    metrics_consts::EXPERIMENT_DECISIONS_COUNTER,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, EnumIter, strum::Display,
)]
pub enum ExperimentName {
    #[strum(serialize = "tokenCode")]
    TokenCode,
    #[strum(serialize = "emailFirst")]
    EmailFirst,
}

impl ExperimentName {
    pub fn parse(name: &str) -> Result<Self, ExperimentError> {
        name.parse()
            .map_err(|_| ExperimentError::UnknownExperiment(name.to_string()))
    }
}

/// An experiment/group pair pinned by the caller, e.g. for QA.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForcedExperiment {
    pub experiment: String,
    pub group: String,
}

impl ForcedExperiment {
    fn applies_to(&self, name: ExperimentName) -> bool {
        !self.group.is_empty() && self.experiment == name.to_string()
    }
}

/// Every grouping rule the portal knows, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct GroupingRules {
    token_code: TokenCodeGroupingRule,
    email_first: EmailFirstGroupingRule,
}

impl GroupingRules {
    pub fn new(token_code: TokenCodeGroupingRule, email_first: EmailFirstGroupingRule) -> Self {
        GroupingRules {
            token_code,
            email_first,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ExperimentError> {
        let clients = match &config.rollout_clients_path {
            Some(path) => RolloutClients::from_file(path)?,
            None => RolloutClients::token_code_defaults(),
        };
        let test_emails = TestEmailMatcher::new(config.test_email_pattern())?;

        for (name, rate) in [
            ("SYNC_ROLLOUT_RATE", config.sync_rollout_rate),
            ("EMAIL_FIRST_ROLLOUT_RATE", config.email_first_rollout_rate),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(ExperimentError::InvalidRolloutConfig(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }

        Ok(GroupingRules::new(
            TokenCodeGroupingRule::new(Arc::new(clients), config.sync_rollout_rate, test_emails),
            EmailFirstGroupingRule::new(config.email_first_rollout_rate),
        ))
    }

    pub fn rule(&self, name: ExperimentName) -> &dyn GroupingRule {
        match name {
            ExperimentName::TokenCode => &self.token_code,
            ExperimentName::EmailFirst => &self.email_first,
        }
    }

    #[instrument(skip_all, level = "debug", fields(experiment = %name))]
    pub fn choose(&self, name: ExperimentName, subject: &Subject) -> Decision {
        let decision = self.rule(name).choose(subject);

        let labels = [
            ("experiment", name.to_string()),
            ("enrolled", decision.is_enrolled().to_string()),
        ];
        counter!(EXPERIMENT_DECISIONS_COUNTER, &labels).increment(1);
        tracing::debug!(decision = ?decision, "chose experiment group");

        decision
    }

    /// Like [`GroupingRules::choose`], but a matching forced group wins without consulting the rule.
    pub fn choose_with_override(
        &self,
        name: ExperimentName,
        subject: &Subject,
        forced: Option<&ForcedExperiment>,
    ) -> Decision {
        match forced {
            Some(forced) if forced.applies_to(name) => Decision::Group(forced.group.clone()),
            _ => self.choose(name, subject),
        }
    }

    pub fn choose_all(
        &self,
        subject: &Subject,
        forced: Option<&ForcedExperiment>,
    ) -> BTreeMap<String, Decision> {
        ExperimentName::iter()
            .map(|name| {
                (
                    name.to_string(),
                    self.choose_with_override(name, subject, forced),
                )
            })
            .collect()
    }

    pub fn is_in_experiment(&self, name: ExperimentName, subject: &Subject) -> bool {
        self.choose(name, subject).is_enrolled()
    }

    pub fn is_in_experiment_group(
        &self,
        name: ExperimentName,
        group: &str,
        subject: &Subject,
    ) -> bool {
        self.choose(name, subject).is_group(group)
    }
}

impl Default for GroupingRules {
    fn default() -> Self {
        GroupingRules::new(
            TokenCodeGroupingRule::default(),
            EmailFirstGroupingRule::default(),
        )
    }
}
