use serde::{Deserialize, Serialize};

use crate::flows::Navigation;

/// Buttons on the "your email bounced" screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BouncedAction {
    CreateAccount,
    SignIn,
}

/// Where the bounced-email screen sends the visitor, and whether stored accounts,
/// the session and any prefilled email must be dropped first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BouncedStep {
    pub navigation: Navigation,
    pub clear_local_state: bool,
}

/// The screen can't render without the bounced address, so it goes back to `/`.
pub fn before_render(email: Option<&str>) -> Option<Navigation> {
    match email.filter(|e| !e.is_empty()) {
        Some(_) => None,
        None => Some(Navigation::to("/")),
    }
}

pub fn on_action(action: BouncedAction, email: &str) -> BouncedStep {
    match action {
        BouncedAction::CreateAccount => BouncedStep {
            navigation: Navigation::to("signup"),
            clear_local_state: true,
        },
        BouncedAction::SignIn => BouncedStep {
            navigation: Navigation::to("/").with_bounced_email(email),
            clear_local_state: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_email_goes_home() {
        assert_eq!(before_render(None), Some(Navigation::to("/")));
        assert_eq!(before_render(Some("")), Some(Navigation::to("/")));
        assert_eq!(before_render(Some("a@example.com")), None);
    }

    #[test]
    fn test_create_account_clears_state() {
        let step = on_action(BouncedAction::CreateAccount, "a@example.com");
        assert!(step.clear_local_state);
        assert_eq!(step.navigation, Navigation::to("signup"));
    }

    #[test]
    fn test_sign_in_carries_bounced_email() {
        let step = on_action(BouncedAction::SignIn, "a@example.com");
        assert!(!step.clear_local_state);
        assert_eq!(step.navigation.url, "/");
        assert_eq!(
            step.navigation.bounced_email.as_deref(),
            Some("a@example.com")
        );
    }
}
