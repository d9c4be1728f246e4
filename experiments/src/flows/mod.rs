//! Page-level decisions that depend on experiment groups. Each flow takes what the page
//! knows and returns where the visitor should go next; nothing here touches the DOM.

use serde::Serialize;

pub mod email_first;
pub mod landing;
pub mod sign_in_bounced;

/// Where to send the visitor, and the data the next page starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub url: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounced_email: Option<String>,
}

impl Navigation {
    pub fn to(url: impl Into<String>) -> Self {
        Navigation {
            url: url.into(),
            replace: false,
            account_email: None,
            bounced_email: None,
        }
    }

    pub fn replace(url: impl Into<String>) -> Self {
        Navigation {
            replace: true,
            ..Navigation::to(url)
        }
    }

    pub fn with_account_email(mut self, email: impl Into<String>) -> Self {
        self.account_email = Some(email.into());
        self
    }

    pub fn with_bounced_email(mut self, email: impl Into<String>) -> Self {
        self.bounced_email = Some(email.into());
        self
    }
}
