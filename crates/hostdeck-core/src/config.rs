// ── Runtime connection configuration ──
//
// These types describe how to reach a panel and how to poll it. They carry
// credentials and tuning but never touch disk; the TUI builds a
// `PanelConfig` (usually via hostdeck-config) and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Telemetry refresh cadence for a visible server.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// How to authenticate with the panel.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Client API key (`ptlc_...`).
    ApiKey(SecretString),
    /// Cookie session via the web login routes.
    Session {
        username: String,
        password: SecretString,
        /// TOTP code for accounts with two-factor enabled.
        totp: Option<SecretString>,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed panels).
    DangerAcceptInvalid,
}

impl TlsVerification {
    pub(crate) fn to_tls_mode(&self) -> hostdeck_api::TlsMode {
        match self {
            Self::SystemDefaults => hostdeck_api::TlsMode::System,
            Self::CustomCa(path) => hostdeck_api::TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => hostdeck_api::TlsMode::DangerAcceptInvalid,
        }
    }
}

/// What a poller does with its held sample when a fetch fails.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FailurePolicy {
    /// Drop the sample so the row reverts to its loading display.
    #[default]
    Clear,
    /// Leave the last good sample in place.
    Keep,
}

/// Configuration for connecting to a single panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Panel URL (e.g. `https://panel.example.com`).
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Telemetry refresh interval for each visible server.
    pub poll_interval: Duration,
    pub on_failure: FailurePolicy,
}

impl PanelConfig {
    /// Config with default TLS, timeout, and polling settings.
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
            on_failure: FailurePolicy::default(),
        }
    }

    pub(crate) fn transport(&self) -> hostdeck_api::TransportConfig {
        hostdeck_api::TransportConfig {
            tls: self.tls.to_tls_mode(),
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn failure_policy_parses_lowercase() {
        assert_eq!("keep".parse::<FailurePolicy>().unwrap(), FailurePolicy::Keep);
        assert_eq!(FailurePolicy::Clear.to_string(), "clear");
        assert!("stale".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn new_config_polls_every_thirty_seconds() {
        let cfg = PanelConfig::new(
            Url::parse("https://panel.example.com").unwrap(),
            AuthCredentials::ApiKey("ptlc_x".to_string().into()),
        );
        assert_eq!(cfg.poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.on_failure, FailurePolicy::Clear);
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    }
}
