use serde::{Deserialize, Serialize};

/// The account the visitor is acting as, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Everything a grouping rule may look at when placing a visitor into an experiment.
///
/// Built per decision from the session, the account and the embedding runtime. Every field
/// is optional on the wire; rules treat a missing field as "not eligible".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(default)]
    pub is_token_code_supported: bool,
    #[serde(default)]
    pub is_email_first_supported: bool,
}

impl Subject {
    pub fn new(unique_user_id: impl Into<String>) -> Self {
        Subject {
            unique_user_id: Some(unique_user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.account = Some(Account {
            email: Some(email.into()),
        });
        self
    }

    pub fn with_account(mut self) -> Self {
        self.account.get_or_insert_with(Account::default);
        self
    }

    pub fn with_token_code_supported(mut self, supported: bool) -> Self {
        self.is_token_code_supported = supported;
        self
    }

    pub fn with_email_first_supported(mut self, supported: bool) -> Self {
        self.is_email_first_supported = supported;
        self
    }

    /// The bucketing identifier, ignoring empty strings.
    pub fn unique_user_id(&self) -> Option<&str> {
        non_empty(self.unique_user_id.as_deref())
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(self.client_id.as_deref())
    }

    pub fn service(&self) -> Option<&str> {
        non_empty(self.service.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        self.account
            .as_ref()
            .and_then(|account| non_empty(account.email.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
