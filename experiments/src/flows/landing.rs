use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    flows::{
        email_first::{EMAIL_ACTION, TREATMENT_GROUP},
        Navigation,
    },
    grouping::rule::Decision,
};

/// What `/` knows about the visitor when it decides where they go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingContext {
    /// `action` query param set by the relier, e.g. `signin`, `signup` or `email`.
    #[serde(default)]
    pub action: Option<String>,
    /// Email the relier asked us to use.
    #[serde(default)]
    pub relier_email: Option<String>,
    /// Account handed over by the previous screen, e.g. after "Mistyped email".
    #[serde(default)]
    pub account_email: Option<String>,
    #[serde(default)]
    pub bounced_email: Option<String>,
    #[serde(default)]
    pub suggested_account_email: Option<String>,
    #[serde(default)]
    pub allow_suggested_account: bool,
    /// Whether the signed-in account has a session token.
    #[serde(default)]
    pub has_session_token: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailEntryError {
    SignupEmailBounce,
    DifferentEmailRequired,
    DifferentEmailRequiredFirefoxDomain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LandingOutcome {
    Navigate(Navigation),
    #[serde(rename_all = "camelCase")]
    ShowEmailForm {
        #[serde(skip_serializing_if = "Option::is_none")]
        prefill_email: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<EmailEntryError>,
    },
    /// Look the email up, then continue with [`after_email_check`].
    CheckEmail { email: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingDecision {
    /// Sign-in and sign-up use their password-only pages for the rest of the session.
    pub email_first_flow: bool,
    #[serde(flatten)]
    pub outcome: LandingOutcome,
}

/// `email_first` is the visitor's email-first group, with any forced group already applied.
#[instrument(skip_all, level = "debug")]
pub fn decide(context: &LandingContext, email_first: &Decision) -> LandingDecision {
    let action = context.action.as_deref().filter(|a| !a.is_empty());

    if let Some(action) = action.filter(|a| *a != EMAIL_ACTION) {
        return LandingDecision {
            email_first_flow: false,
            outcome: LandingOutcome::Navigate(Navigation::replace(action)),
        };
    }

    if email_first.is_group(TREATMENT_GROUP) || action == Some(EMAIL_ACTION) {
        return LandingDecision {
            email_first_flow: true,
            outcome: choose_email_first_step(context),
        };
    }

    let page = if context.has_session_token {
        "settings"
    } else {
        "signup"
    };
    LandingDecision {
        email_first_flow: false,
        outcome: LandingOutcome::Navigate(Navigation::replace(page)),
    }
}

fn choose_email_first_step(context: &LandingContext) -> LandingOutcome {
    if let Some(email) = non_empty(&context.account_email) {
        return LandingOutcome::ShowEmailForm {
            prefill_email: Some(email.clone()),
            error: None,
        };
    }

    if let Some(email) = non_empty(&context.relier_email) {
        return LandingOutcome::CheckEmail {
            email: email.clone(),
        };
    }

    if let Some(email) = non_empty(&context.bounced_email) {
        return LandingOutcome::ShowEmailForm {
            prefill_email: Some(email.clone()),
            error: Some(EmailEntryError::SignupEmailBounce),
        };
    }

    if let Some(email) =
        non_empty(&context.suggested_account_email).filter(|_| context.allow_suggested_account)
    {
        return LandingOutcome::Navigate(Navigation::replace("signin").with_account_email(email));
    }

    LandingOutcome::ShowEmailForm {
        prefill_email: None,
        error: None,
    }
}

fn non_empty(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.is_empty())
}

/// Checks what the visitor typed into the email form.
pub fn validate_email_entry(
    email: &str,
    bounced_email: Option<&str>,
) -> Result<(), EmailEntryError> {
    if bounced_email.is_some_and(|bounced| bounced == email) {
        return Err(EmailEntryError::DifferentEmailRequired);
    }

    // @firefox and @firefox.com addresses can't hold accounts
    if email.ends_with("@firefox") || email.ends_with("@firefox.com") {
        return Err(EmailEntryError::DifferentEmailRequiredFirefoxDomain);
    }

    Ok(())
}

pub fn after_email_check(email: &str, exists: bool) -> Navigation {
    let page = if exists { "signin" } else { "signup" };
    Navigation::to(page).with_account_email(email)
}
