use serde::Serialize;

use crate::grouping::rule::Decision;

pub const EMAIL_ACTION: &str = "email";
pub const TREATMENT_GROUP: &str = "treatment";

/// What a page taking part in the email-first experiment does before it renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailFirstRedirect {
    /// Group to report the experiment under, when the visitor is enrolled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_group: Option<String>,
    /// Page that replaces the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// `action=email` always sends the visitor to the treatment page; otherwise only the
/// treatment group goes there. Pages without a treatment page never redirect.
pub fn before_render(
    action: Option<&str>,
    treatment_pathname: Option<&str>,
    email_first: &Decision,
) -> EmailFirstRedirect {
    if action == Some(EMAIL_ACTION) {
        if let Some(pathname) = treatment_pathname {
            return EmailFirstRedirect {
                recorded_group: None,
                redirect_to: Some(pathname.to_string()),
            };
        }
    }

    let Some(group) = email_first.group() else {
        return EmailFirstRedirect::default();
    };

    EmailFirstRedirect {
        recorded_group: Some(group.to_string()),
        redirect_to: treatment_pathname
            .filter(|_| group == TREATMENT_GROUP)
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn treatment() -> Decision {
        Decision::Group(TREATMENT_GROUP.to_string())
    }

    #[test]
    fn test_email_action_redirects_without_recording() {
        let redirect = before_render(Some("email"), Some("/"), &Decision::NotEnrolled);
        assert_eq!(redirect.redirect_to.as_deref(), Some("/"));
        assert_eq!(redirect.recorded_group, None);

        // the action wins over the experiment
        let redirect = before_render(Some("email"), Some("/"), &treatment());
        assert_eq!(redirect.recorded_group, None);
    }

    #[test]
    fn test_email_action_without_treatment_page_falls_back_to_experiment() {
        let redirect = before_render(Some("email"), None, &treatment());
        assert_eq!(redirect.recorded_group.as_deref(), Some("treatment"));
        assert_eq!(redirect.redirect_to, None);
    }

    #[test]
    fn test_treatment_redirects() {
        let redirect = before_render(None, Some("/"), &treatment());
        assert_eq!(
            redirect,
            EmailFirstRedirect {
                recorded_group: Some("treatment".to_string()),
                redirect_to: Some("/".to_string()),
            }
        );
    }

    #[test]
    fn test_control_is_recorded_but_stays() {
        let redirect = before_render(None, Some("/"), &Decision::Group("control".to_string()));
        assert_eq!(redirect.recorded_group.as_deref(), Some("control"));
        assert_eq!(redirect.redirect_to, None);
    }

    #[test]
    fn test_not_enrolled_does_nothing() {
        assert_eq!(
            before_render(Some("signin"), Some("/"), &Decision::NotEnrolled),
            EmailFirstRedirect::default()
        );
    }
}
