use serde::Serialize;

use VerificationReason::{
    PasswordReset, PrimaryEmailVerified, SecondaryEmailVerified, SignIn as SignInReason,
    SignUp as SignUpReason,
};

/// Why a confirmation or "ready" screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationReason {
    #[serde(rename = "signin")]
    SignIn,
    #[serde(rename = "signup")]
    SignUp,
    PasswordReset,
    PrimaryEmailVerified,
    SecondaryEmailVerified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View {
        view: &'static str,
        reason: Option<VerificationReason>,
    },
    ChildView {
        child: &'static str,
        parent: &'static str,
    },
    /// `sign_in`, or `sign_in_password` once the visitor is in the email-first flow.
    SignIn,
    /// `sign_up`, or `sign_up_password` once the visitor is in the email-first flow.
    SignUp,
}

const fn view(view: &'static str) -> RouteTarget {
    RouteTarget::View { view, reason: None }
}

const fn ready(view: &'static str, reason: VerificationReason) -> RouteTarget {
    RouteTarget::View {
        view,
        reason: Some(reason),
    }
}

const fn child(child: &'static str, parent: &'static str) -> RouteTarget {
    RouteTarget::ChildView { child, parent }
}

const ROUTES: &[(&str, RouteTarget)] = &[
    ("", view("index")),
    ("authorization", view("authorization")),
    ("cannot_create_account", view("cannot_create_account")),
    ("choose_what_to_sync", view("choose_what_to_sync")),
    ("clear", view("clear_storage")),
    ("complete_reset_password", view("complete_reset_password")),
    ("complete_signin", ready("complete_sign_up", SignInReason)),
    ("confirm", ready("confirm", SignUpReason)),
    ("confirm_reset_password", view("confirm_reset_password")),
    ("confirm_signin", ready("confirm", SignInReason)),
    ("connect_another_device", view("connect_another_device")),
    (
        "connect_another_device/why",
        child("why_connect_another_device", "connect_another_device"),
    ),
    ("cookies_disabled", view("cookies_disabled")),
    ("force_auth", view("force_auth")),
    ("legal", view("legal")),
    ("legal/privacy", view("pp")),
    ("legal/terms", view("tos")),
    ("oauth", view("oauth_index")),
    ("oauth/force_auth", view("force_auth")),
    ("oauth/signin", RouteTarget::SignIn),
    ("oauth/signup", RouteTarget::SignUp),
    ("primary_email_verified", ready("ready", PrimaryEmailVerified)),
    ("report_signin", view("report_sign_in")),
    ("reset_password", view("reset_password")),
    ("reset_password_confirmed", ready("ready", PasswordReset)),
    ("reset_password_verified", ready("ready", PasswordReset)),
    ("secondary_email_verified", ready("ready", SecondaryEmailVerified)),
    ("settings", view("settings")),
    ("settings/avatar/camera", child("settings/avatar_camera", "settings")),
    ("settings/avatar/change", child("settings/avatar_change", "settings")),
    ("settings/avatar/crop", child("settings/avatar_crop", "settings")),
    ("settings/change_password", child("settings/change_password", "settings")),
    ("settings/clients", child("settings/clients", "settings")),
    ("settings/clients/disconnect", child("settings/client_disconnect", "settings")),
    (
        "settings/communication_preferences",
        child("settings/communication_preferences", "settings"),
    ),
    ("settings/delete_account", child("settings/delete_account", "settings")),
    ("settings/display_name", child("settings/display_name", "settings")),
    ("settings/emails", child("settings/emails", "settings")),
    (
        "settings/two_step_authentication",
        child("settings/two_step_authentication", "settings"),
    ),
    (
        "settings/two_step_authentication/recovery_codes",
        child("settings/recovery_codes", "settings"),
    ),
    ("signin", RouteTarget::SignIn),
    ("signin_bounced", view("sign_in_bounced")),
    ("signin_confirmed", ready("ready", SignInReason)),
    ("signin_permissions", ready("permissions", SignInReason)),
    ("signin_recovery_code", view("sign_in_recovery_code")),
    ("signin_reported", view("sign_in_reported")),
    ("signin_token_code", view("sign_in_token_code")),
    ("signin_totp_code", view("sign_in_totp_code")),
    ("signin_unblock", view("sign_in_unblock")),
    ("signin_verified", ready("ready", SignInReason)),
    ("signup", RouteTarget::SignUp),
    ("signup_confirmed", ready("ready", SignUpReason)),
    ("signup_permissions", ready("permissions", SignUpReason)),
    ("signup_verified", ready("ready", SignUpReason)),
    ("sms", view("sms_send")),
    ("sms/sent", view("sms_sent")),
    ("sms/why", child("why_connect_another_device", "sms_send")),
    ("verify_email", ready("complete_sign_up", SignUpReason)),
    ("verify_primary_email", ready("complete_sign_up", PrimaryEmailVerified)),
    ("verify_secondary_email", ready("complete_sign_up", SecondaryEmailVerified)),
];

/// A route target with the email-first choice applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoute {
    pub page: String,
    pub view_name: String,
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<VerificationReason>,
}

/// Path part of a fragment without surrounding slashes. Query params can carry
/// sensitive data, so they never make it into page or view names.
pub fn current_page(fragment: &str) -> &str {
    let path = fragment.split('?').next().unwrap_or_default();
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// The name views are reported under in metrics, e.g. `settings/two_step_authentication`
/// becomes `settings.two-step-authentication`.
pub fn fragment_to_view_name(fragment: &str) -> String {
    current_page(fragment).replace('/', ".").replace('_', "-")
}

pub fn lookup(fragment: &str) -> Option<RouteTarget> {
    let page = current_page(fragment);
    ROUTES
        .iter()
        .find(|(pattern, _)| *pattern == page)
        .map(|(_, target)| *target)
}

pub fn resolve(fragment: &str, email_first_flow: bool) -> Option<ResolvedRoute> {
    let (view, parent, reason) = match lookup(fragment)? {
        RouteTarget::View { view, reason } => (view, None, reason),
        RouteTarget::ChildView { child, parent } => (child, Some(parent), None),
        RouteTarget::SignIn if email_first_flow => ("sign_in_password", None, None),
        RouteTarget::SignIn => ("sign_in", None, None),
        RouteTarget::SignUp if email_first_flow => ("sign_up_password", None, None),
        RouteTarget::SignUp => ("sign_up", None, None),
    };

    Some(ResolvedRoute {
        page: current_page(fragment).to_string(),
        view_name: fragment_to_view_name(fragment),
        view,
        parent,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("/settings/", "settings")]
    #[case("settings/emails", "settings/emails")]
    #[case("/signin?email=a@b.c", "signin")]
    #[case("", "")]
    #[case("/", "")]
    fn test_current_page(#[case] fragment: &str, #[case] page: &str) {
        assert_eq!(current_page(fragment), page);
    }

    #[rstest]
    #[case("/settings/two_step_authentication/", "settings.two-step-authentication")]
    #[case("signin_token_code?uid=123", "signin-token-code")]
    #[case("legal/privacy", "legal.privacy")]
    #[case("", "")]
    fn test_fragment_to_view_name(#[case] fragment: &str, #[case] name: &str) {
        assert_eq!(fragment_to_view_name(fragment), name);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(""), Some(view("index")));
        assert_eq!(lookup("/clear/"), Some(view("clear_storage")));
        assert_eq!(
            lookup("confirm_signin"),
            Some(ready("confirm", VerificationReason::SignIn))
        );
        assert_eq!(
            lookup("sms/why"),
            Some(child("why_connect_another_device", "sms_send"))
        );
        assert_eq!(lookup("signin"), Some(RouteTarget::SignIn));
        assert_eq!(lookup("does_not_exist"), None);
        assert_eq!(lookup("settings/emails/extra"), None);
    }

    #[test]
    fn test_routes_are_unique() {
        for (i, (pattern, _)) in ROUTES.iter().enumerate() {
            assert!(
                ROUTES[i + 1..].iter().all(|(other, _)| other != pattern),
                "duplicate route {pattern}"
            );
        }
    }

    #[test]
    fn test_sign_in_and_up_follow_the_email_first_flow() {
        assert_eq!(resolve("signin", false).unwrap().view, "sign_in");
        assert_eq!(resolve("signin", true).unwrap().view, "sign_in_password");
        assert_eq!(resolve("oauth/signup", false).unwrap().view, "sign_up");
        assert_eq!(resolve("oauth/signup", true).unwrap().view, "sign_up_password");
        // other routes ignore the flow
        assert_eq!(resolve("settings", true).unwrap().view, "settings");
    }

    #[test]
    fn test_resolve_child_view() {
        let route = resolve("/settings/clients/disconnect/", false).unwrap();
        assert_eq!(route.page, "settings/clients/disconnect");
        assert_eq!(route.view_name, "settings.clients.disconnect");
        assert_eq!(route.view, "settings/client_disconnect");
        assert_eq!(route.parent, Some("settings"));
        assert_eq!(route.reason, None);
    }

    #[test]
    fn test_resolved_route_json() {
        let route = resolve("reset_password_verified", false).unwrap();
        assert_eq!(
            serde_json::to_value(route).unwrap(),
            json!({
                "page": "reset_password_verified",
                "viewName": "reset-password-verified",
                "view": "ready",
                "reason": "password_reset"
            })
        );

        let route = resolve("signin_verified", false).unwrap();
        assert_eq!(serde_json::to_value(route).unwrap()["reason"], json!("signin"));
    }
}
