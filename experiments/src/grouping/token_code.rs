use std::sync::Arc;

use tracing::instrument;

use crate::grouping::{
    rollout_config::RolloutClients,
    rule::{Decision, GroupingRule, TestEmailMatcher},
    subject::Subject,
};

pub const TOKEN_CODE_EXPERIMENT: &str = "tokenCode";
pub const GROUPS_DEFAULT: [&str; 3] = ["control", "treatment-code", "treatment-link"];
pub const SYNC_SERVICE: &str = "sync";

/// Decides whether sign-in confirmation uses a typed code (or a link) instead of the
/// classic confirmation email.
///
/// Relying clients roll out through [`RolloutClients`]; a client that is not in the table
/// never gets the experiment. Sync sign-ins without a client id use the global sync rate.
#[derive(Debug, Clone)]
pub struct TokenCodeGroupingRule {
    clients: Arc<RolloutClients>,
    sync_rollout_rate: f64,
    test_emails: TestEmailMatcher,
    default_groups: Vec<String>,
}

impl TokenCodeGroupingRule {
    pub fn new(
        clients: Arc<RolloutClients>,
        sync_rollout_rate: f64,
        test_emails: TestEmailMatcher,
    ) -> Self {
        TokenCodeGroupingRule {
            clients,
            sync_rollout_rate,
            test_emails,
            default_groups: GROUPS_DEFAULT.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn clients(&self) -> &RolloutClients {
        &self.clients
    }
}

impl Default for TokenCodeGroupingRule {
    fn default() -> Self {
        TokenCodeGroupingRule::new(
            Arc::new(RolloutClients::token_code_defaults()),
            0.0,
            TestEmailMatcher::default(),
        )
    }
}

impl GroupingRule for TokenCodeGroupingRule {
    fn name(&self) -> &'static str {
        TOKEN_CODE_EXPERIMENT
    }

    #[instrument(skip_all, level = "debug", fields(client_id = ?subject.client_id()))]
    fn choose(&self, subject: &Subject) -> Decision {
        let Some(unique_user_id) = subject.unique_user_id() else {
            return Decision::NotEnrolled;
        };
        if !subject.is_token_code_supported || subject.account.is_none() {
            return Decision::NotEnrolled;
        }

        if let Some(client_id) = subject.client_id() {
            let Some(client) = self.clients.get(client_id) else {
                tracing::debug!("client is not part of the rollout");
                return Decision::NotEnrolled;
            };
            let groups = client.groups.as_deref().unwrap_or(&self.default_groups);

            if client.enable_test_emails
                && subject
                    .email()
                    .is_some_and(|email| self.test_emails.is_test_email(email))
            {
                return self.uniform_choice(groups, unique_user_id);
            }

            if self.bernoulli_trial(client.rollout_rate, unique_user_id) {
                return self.uniform_choice(groups, unique_user_id);
            }

            return Decision::NotEnrolled;
        }

        if subject.service() == Some(SYNC_SERVICE)
            && self.bernoulli_trial(self.sync_rollout_rate, unique_user_id)
        {
            return self.uniform_choice(&self.default_groups, unique_user_id);
        }

        Decision::NotEnrolled
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;
    use crate::grouping::rollout_config::ClientRolloutConfig;

    fn client(
        groups: Option<&[&str]>,
        rollout_rate: f64,
        enable_test_emails: bool,
    ) -> ClientRolloutConfig {
        ClientRolloutConfig {
            name: "client".to_string(),
            enable_test_emails,
            groups: groups.map(|gs| gs.iter().map(|g| g.to_string()).collect()),
            rollout_rate,
        }
    }

    fn rule_with(
        clients: Vec<(&str, ClientRolloutConfig)>,
        sync_rollout_rate: f64,
    ) -> TokenCodeGroupingRule {
        let clients = RolloutClients::new(
            clients
                .into_iter()
                .map(|(id, config)| (id.to_string(), config))
                .collect::<HashMap<_, _>>(),
        )
        .unwrap();
        TokenCodeGroupingRule::new(
            Arc::new(clients),
            sync_rollout_rate,
            TestEmailMatcher::default(),
        )
    }

    fn eligible(id: &str) -> Subject {
        Subject::new(id)
            .with_email("someone@example.com")
            .with_token_code_supported(true)
    }

    #[rstest]
    #[case::no_unique_user_id(Subject { unique_user_id: None, ..eligible("x").with_client_id("X") })]
    #[case::empty_unique_user_id(eligible("").with_client_id("X"))]
    #[case::not_supported(eligible("user-1").with_client_id("X").with_token_code_supported(false))]
    #[case::no_account(Subject { account: None, ..eligible("user-1").with_client_id("X") })]
    fn test_missing_required_fields_are_not_enrolled(#[case] subject: Subject) {
        let rule = rule_with(
            vec![("X", client(Some(&["control", "treatment"]), 1.0, false))],
            1.0,
        );
        assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
    }

    #[test]
    fn test_account_without_email_is_eligible() {
        let subject = Subject::new("user-1")
            .with_client_id("X")
            .with_account()
            .with_token_code_supported(true);
        assert_eq!(subject.email(), None);

        let rule = rule_with(vec![("X", client(Some(&["treatment"]), 1.0, true))], 0.0);
        assert_eq!(rule.choose(&subject), Decision::Group("treatment".to_string()));

        // no email to match the test pattern against
        let rule = rule_with(vec![("X", client(Some(&["treatment"]), 0.0, true))], 0.0);
        assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
    }

    #[test]
    fn test_full_rollout_always_assigns_a_configured_group() {
        let rule = rule_with(
            vec![("X", client(Some(&["control", "treatment"]), 1.0, false))],
            0.0,
        );

        for id in ["user-1", "user-2"] {
            let subject = eligible(id).with_client_id("X");
            let decision = rule.choose(&subject);
            let group = decision.group().expect("enrolled");
            assert!(["control", "treatment"].contains(&group));
            assert_eq!(rule.choose(&subject), decision);
        }

        for i in 0..500 {
            let decision = rule.choose(&eligible(&format!("user-{i}")).with_client_id("X"));
            assert!(decision.is_group("control") || decision.is_group("treatment"));
        }
    }

    #[test]
    fn test_zero_rollout_never_enrolls() {
        let rule = rule_with(vec![("X", client(None, 0.0, false))], 1.0);
        for i in 0..500 {
            let subject = eligible(&format!("user-{i}")).with_client_id("X");
            assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
        }
    }

    #[test]
    fn test_unknown_client_is_not_enrolled() {
        // even with the sync service at full rollout
        let rule = rule_with(vec![("X", client(None, 1.0, false))], 1.0);
        for i in 0..100 {
            let subject = eligible(&format!("user-{i}"))
                .with_client_id("not-configured")
                .with_service(SYNC_SERVICE);
            assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
        }
    }

    #[test]
    fn test_test_emails_bypass_rollout() {
        let rule = rule_with(
            vec![("X", client(Some(&["treatment-code"]), 0.0, true))],
            0.0,
        );
        for i in 0..100 {
            let subject = Subject::new(format!("user-{i}"))
                .with_client_id("X")
                .with_email(format!("qa{i}@mozilla.com"))
                .with_token_code_supported(true);
            assert_eq!(
                rule.choose(&subject),
                Decision::Group("treatment-code".to_string())
            );
        }

        // non-test emails still go through the zero rollout
        let subject = eligible("user-1").with_client_id("X");
        assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
    }

    #[test]
    fn test_test_emails_ignored_when_client_disallows_them() {
        let rule = rule_with(vec![("X", client(None, 0.0, false))], 0.0);
        let subject = Subject::new("user-1")
            .with_client_id("X")
            .with_email("qa@mozilla.com")
            .with_token_code_supported(true);
        assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
    }

    #[test]
    fn test_client_without_groups_uses_defaults() {
        let rule = rule_with(vec![("X", client(None, 1.0, false))], 0.0);
        // user-1 picks index 2 out of three
        assert_eq!(
            rule.choose(&eligible("user-1").with_client_id("X")),
            Decision::Group("treatment-link".to_string())
        );
        assert_eq!(
            rule.choose(&eligible("user-3").with_client_id("X")),
            Decision::Group("control".to_string())
        );
    }

    #[test]
    fn test_partial_rollout_follows_the_hash() {
        // user-1 hashes to ~0.577, user-2 to ~0.126
        let rule = rule_with(vec![("X", client(None, 0.5, false))], 0.0);
        assert_eq!(
            rule.choose(&eligible("user-1").with_client_id("X")),
            Decision::NotEnrolled
        );
        assert!(rule
            .choose(&eligible("user-2").with_client_id("X"))
            .is_enrolled());
    }

    #[test]
    fn test_sync_service_uses_global_rate() {
        let rule = rule_with(vec![], 1.0);
        let subject = eligible("user-1").with_service(SYNC_SERVICE);
        assert_eq!(
            rule.choose(&subject),
            Decision::Group("treatment-link".to_string())
        );

        let rule = rule_with(vec![], 0.0);
        assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
    }

    #[test]
    fn test_other_services_are_not_enrolled() {
        let rule = rule_with(vec![], 1.0);
        assert_eq!(
            rule.choose(&eligible("user-1").with_service("amo")),
            Decision::NotEnrolled
        );
        assert_eq!(rule.choose(&eligible("user-1")), Decision::NotEnrolled);
    }

    #[test]
    fn test_empty_client_id_falls_through_to_service() {
        let rule = rule_with(vec![], 1.0);
        let subject = eligible("user-1")
            .with_client_id("")
            .with_service(SYNC_SERVICE);
        assert!(rule.choose(&subject).is_enrolled());
    }

    #[test]
    fn test_default_rule_ships_disabled() {
        let rule = TokenCodeGroupingRule::default();
        for client_id in ["37fdfa37698f251a", "98adfa37698f255b", "ecdb5ae7add825d4"] {
            let subject = eligible("user-1").with_client_id(client_id);
            assert_eq!(rule.choose(&subject), Decision::NotEnrolled);
        }
        assert_eq!(
            rule.choose(&eligible("user-1").with_service(SYNC_SERVICE)),
            Decision::NotEnrolled
        );

        // except for internal testers of the iOS extension
        let subject = Subject::new("user-1")
            .with_client_id("98adfa37698f255b")
            .with_email("qa@mozilla.org")
            .with_token_code_supported(true);
        assert_eq!(
            rule.choose(&subject),
            Decision::Group("treatment-code".to_string())
        );
    }
}
