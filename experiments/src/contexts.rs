//! Resolves the `context` and `service` strings a page is loaded with to the auth broker
//! and relier the front-end should construct. Unknown strings fall back to the plain web
//! broker and the base relier.

use serde::Serialize;
use strum::{EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize)]
pub enum AuthBrokerKind {
    #[strum(serialize = "fx_sync")]
    FxSync,
    #[strum(serialize = "fx_desktop_v1")]
    FxDesktopV1,
    #[strum(serialize = "fx_desktop_v2")]
    FxDesktopV2,
    #[strum(serialize = "fx_desktop_v3")]
    FxDesktopV3,
    #[strum(serialize = "fx_fennec_v1")]
    FxFennecV1,
    #[strum(serialize = "iframe")]
    FxFirstrunV1,
    #[strum(serialize = "fx_firstrun_v2")]
    FxFirstrunV2,
    #[strum(serialize = "fx_ios_v1")]
    FxIosV1,
    #[strum(serialize = "mob_android_v1")]
    MobileAndroidV1,
    #[strum(serialize = "mob_ios_v1")]
    MobileIosV1,
    #[strum(serialize = "oauth")]
    OAuthRedirect,
    #[strum(serialize = "oauth_chrome_android")]
    OAuthRedirectChromeAndroid,
    #[strum(serialize = "web")]
    Web,
}

impl AuthBrokerKind {
    pub fn from_context(context: &str) -> Self {
        context.parse().unwrap_or(AuthBrokerKind::Web)
    }

    /// The broker implementation the front-end loads for this kind.
    pub fn module_name(&self) -> &'static str {
        match self {
            AuthBrokerKind::FxSync => "fx-sync",
            AuthBrokerKind::FxDesktopV1 => "fx-desktop-v1",
            AuthBrokerKind::FxDesktopV2 => "fx-desktop-v2",
            AuthBrokerKind::FxDesktopV3 => "fx-desktop-v3",
            AuthBrokerKind::FxFennecV1 => "fx-fennec-v1",
            AuthBrokerKind::FxFirstrunV1 => "fx-firstrun-v1",
            AuthBrokerKind::FxFirstrunV2 => "fx-firstrun-v2",
            AuthBrokerKind::FxIosV1 => "fx-ios-v1",
            AuthBrokerKind::MobileAndroidV1 => "mob-android-v1",
            AuthBrokerKind::MobileIosV1 => "mob-ios-v1",
            AuthBrokerKind::OAuthRedirect => "oauth-redirect",
            AuthBrokerKind::OAuthRedirectChromeAndroid => "oauth-redirect-chrome-android",
            AuthBrokerKind::Web => "web",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize)]
pub enum RelierKind {
    #[strum(serialize = "base")]
    Base,
    #[strum(serialize = "oauth")]
    OAuth,
    #[strum(serialize = "sync")]
    Sync,
}

impl RelierKind {
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(RelierKind::Base)
    }

    pub fn module_name(&self) -> &'static str {
        match self {
            RelierKind::Base => "relier",
            RelierKind::OAuth => "oauth",
            RelierKind::Sync => "sync",
        }
    }
}
