use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{api::errors::ExperimentError, grouping::hashing, grouping::subject::Subject};

pub const DEFAULT_TEST_EMAIL_PATTERN: &str = r"@(mozilla\.(com|org)|softvision\.(com|ro))$";

/// Outcome of a grouping rule: either the visitor stays on the control experience
/// or they are placed into a named group.
///
/// On the wire this is `false` or the group name, which is what front-ends already expect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decision {
    NotEnrolled,
    Group(String),
}

impl Decision {
    pub fn is_enrolled(&self) -> bool {
        matches!(self, Decision::Group(_))
    }

    pub fn is_group(&self, group: &str) -> bool {
        matches!(self, Decision::Group(g) if g == group)
    }

    pub fn group(&self) -> Option<&str> {
        match self {
            Decision::Group(g) => Some(g),
            Decision::NotEnrolled => None,
        }
    }
}

impl From<Option<&str>> for Decision {
    fn from(group: Option<&str>) -> Self {
        match group {
            Some(g) => Decision::Group(g.to_string()),
            None => Decision::NotEnrolled,
        }
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Decision::NotEnrolled => serializer.serialize_bool(false),
            Decision::Group(g) => serializer.serialize_str(g),
        }
    }
}

impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Boolean(bool),
            String(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Boolean(false) => Ok(Decision::NotEnrolled),
            Raw::Boolean(true) => Err(serde::de::Error::custom(
                "a decision is either false or a group name",
            )),
            Raw::String(g) => Ok(Decision::Group(g)),
        }
    }
}

/// Matches internal accounts that may skip rollout gates.
#[derive(Debug, Clone)]
pub struct TestEmailMatcher {
    pattern: Regex,
}

impl TestEmailMatcher {
    pub fn new(pattern: &str) -> Result<Self, ExperimentError> {
        Ok(TestEmailMatcher {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn is_test_email(&self, email: &str) -> bool {
        self.pattern.is_match(email)
    }
}

impl Default for TestEmailMatcher {
    fn default() -> Self {
        TestEmailMatcher {
            pattern: Regex::new(DEFAULT_TEST_EMAIL_PATTERN)
                .expect("default test email pattern is valid"),
        }
    }
}

/// A deterministic rule that places a subject into one experiment's groups.
///
/// Implementations must be pure: the same subject and configuration always yield the
/// same decision. The provided methods hash on the rule's name, so two experiments
/// bucket the same visitor independently.
pub trait GroupingRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn choose(&self, subject: &Subject) -> Decision;

    fn bernoulli_trial(&self, rate: f64, identifier: &str) -> bool {
        hashing::bernoulli_trial(self.name(), rate, identifier)
    }

    fn uniform_choice(&self, groups: &[String], identifier: &str) -> Decision {
        hashing::uniform_choice(self.name(), groups, identifier).into()
    }
}
