use crate::grouping::{
    rule::{Decision, GroupingRule},
    subject::Subject,
};

pub const EMAIL_FIRST_EXPERIMENT: &str = "emailFirst";
pub const EMAIL_FIRST_GROUPS: [&str; 2] = ["control", "treatment"];

/// Decides whether `/` asks for the email address before choosing between
/// sign-in and sign-up. Only brokers that can handle the email-first screens are eligible.
#[derive(Debug, Clone)]
pub struct EmailFirstGroupingRule {
    rollout_rate: f64,
    groups: Vec<String>,
}

impl EmailFirstGroupingRule {
    pub fn new(rollout_rate: f64) -> Self {
        EmailFirstGroupingRule {
            rollout_rate,
            groups: EMAIL_FIRST_GROUPS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl Default for EmailFirstGroupingRule {
    fn default() -> Self {
        EmailFirstGroupingRule::new(0.0)
    }
}

impl GroupingRule for EmailFirstGroupingRule {
    fn name(&self) -> &'static str {
        EMAIL_FIRST_EXPERIMENT
    }

    fn choose(&self, subject: &Subject) -> Decision {
        let Some(unique_user_id) = subject.unique_user_id() else {
            return Decision::NotEnrolled;
        };
        if !subject.is_email_first_supported {
            return Decision::NotEnrolled;
        }

        if self.bernoulli_trial(self.rollout_rate, unique_user_id) {
            self.uniform_choice(&self.groups, unique_user_id)
        } else {
            Decision::NotEnrolled
        }
    }
}
