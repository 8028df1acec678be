//! Profile-based configuration for hostdeck.
//!
//! Profiles live in `config.toml` under the platform config dir and are
//! merged with `HOSTDECK_`-prefixed environment variables. Secrets resolve
//! from an env var, then the system keyring, then the plaintext profile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use hostdeck_core::{AuthCredentials, FailurePolicy, PanelConfig, TlsVerification};

const KEYRING_SERVICE: &str = "hostdeck";

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no panel configured; pass --panel or add a profile")]
    NoPanel,

    #[error("serialization: {0}")]
    Serialization(String),

    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ── File layout ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_profile: Option<String>,
    pub defaults: Defaults,
    pub profiles: HashMap<String, Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Request timeout in seconds.
    pub timeout: u64,
    pub insecure: bool,
    /// Telemetry refresh interval in seconds.
    pub poll_interval_secs: u64,
    /// `clear` or `keep`.
    pub telemetry_on_error: FailurePolicy,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            insecure: false,
            poll_interval_secs: hostdeck_core::config::DEFAULT_POLL_INTERVAL.as_secs(),
            telemetry_on_error: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Panel base URL.
    pub panel: String,
    /// `"api_key"` or `"session"`.
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,
    pub api_key: Option<String>,
    /// Env var to read the API key from.
    pub api_key_env: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub insecure: Option<bool>,
    pub timeout: Option<u64>,
}

fn default_auth_mode() -> String {
    "api_key".into()
}

/// Values from the command line that take precedence over the profile.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub panel: Option<String>,
    pub api_key: Option<SecretString>,
    pub totp: Option<SecretString>,
    pub insecure: bool,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "hostdeck", "hostdeck")
}

/// Path to `config.toml`.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Path to the JSON file backing persisted UI preferences.
pub fn preferences_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".local/share").join("preferences.json"),
        |dirs| dirs.data_dir().join("preferences.json"),
    )
}

fn fallback_dir(relative: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(relative).join("hostdeck")
}

// ── Load / save ─────────────────────────────────────────────────────

/// Load from the default path, environment included.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` merged over defaults, then `HOSTDECK_` env vars
/// (`HOSTDECK_DEFAULTS__TIMEOUT=10` sets `defaults.timeout`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if path.exists() {
        debug!(path = %path.display(), "loading config file");
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("HOSTDECK_").split("__"));

    figment.extract().map_err(|e| ConfigError::from(Box::new(e)))
}

/// Like [`load_config`], but falls back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    })
}

/// Write `config` as pretty TOML, creating parent dirs.
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| ConfigError::Serialization(e.to_string()))?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(profile_name: &str, key: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{key}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

fn env_secret(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// API key: `api_key_env` → keyring → plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(key) = profile.api_key_env.as_deref().and_then(env_secret) {
        return Ok(key);
    }
    if let Some(key) = keyring_secret(profile_name, "api-key") {
        return Ok(key);
    }
    profile
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Username and password: `HOSTDECK_USERNAME`/`HOSTDECK_PASSWORD` →
/// keyring → plaintext.
pub fn resolve_session_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let missing = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };

    let username = std::env::var("HOSTDECK_USERNAME")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| profile.username.clone())
        .ok_or_else(missing)?;

    let password = env_secret("HOSTDECK_PASSWORD")
        .or_else(|| keyring_secret(profile_name, "password"))
        .or_else(|| profile.password.clone().map(SecretString::from))
        .ok_or_else(missing)?;

    Ok((username, password))
}

/// Build credentials for `profile` according to its `auth_mode`.
pub fn resolve_auth(
    profile: &Profile,
    profile_name: &str,
    totp: Option<SecretString>,
) -> Result<AuthCredentials, ConfigError> {
    match profile.auth_mode.as_str() {
        "api_key" => Ok(AuthCredentials::ApiKey(resolve_api_key(profile, profile_name)?)),
        "session" => {
            let (username, password) = resolve_session_credentials(profile, profile_name)?;
            Ok(AuthCredentials::Session {
                username,
                password,
                totp: totp.or_else(|| env_secret("HOSTDECK_TOTP")),
            })
        }
        other => Err(ConfigError::Validation {
            field: "auth_mode".into(),
            reason: format!("unknown auth mode '{other}' (expected api_key or session)"),
        }),
    }
}

fn parse_panel_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|e: url::ParseError| ConfigError::Validation {
        field: "panel".into(),
        reason: e.to_string(),
    })
}

/// Turn a profile into a runtime [`PanelConfig`].
pub fn profile_to_panel_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    totp: Option<SecretString>,
) -> Result<PanelConfig, ConfigError> {
    let auth = resolve_auth(profile, profile_name, totp)?;
    build_panel_config(profile, defaults, auth)
}

fn build_panel_config(
    profile: &Profile,
    defaults: &Defaults,
    auth: AuthCredentials,
) -> Result<PanelConfig, ConfigError> {
    let url = parse_panel_url(&profile.panel)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Validation {
            field: "panel".into(),
            reason: "URL cannot be used as a base".into(),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca) = profile.ca_cert {
        TlsVerification::CustomCa(ca.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = PanelConfig::new(url, auth);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval = Duration::from_secs(defaults.poll_interval_secs);
    config.on_failure = defaults.telemetry_on_error;
    Ok(config)
}

/// Resolve the panel to connect to from config plus command-line overrides.
///
/// `--panel` with no profile selected builds an ad-hoc API-key profile
/// whose key comes from `--api-key` or `HOSTDECK_API_KEY`. Otherwise the
/// named (or default) profile is used with the overrides layered on top.
pub fn resolve_panel_config(
    config: &Config,
    overrides: Overrides,
) -> Result<PanelConfig, ConfigError> {
    let selected = overrides
        .profile
        .clone()
        .or_else(|| config.default_profile.clone());

    let (name, mut profile) = match selected {
        Some(name) => {
            let profile = config
                .profiles
                .get(&name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?;
            (name, profile)
        }
        None => {
            let panel = overrides.panel.clone().ok_or(ConfigError::NoPanel)?;
            ("default".to_owned(), Profile::ad_hoc(panel))
        }
    };

    if let Some(panel) = overrides.panel {
        profile.panel = panel;
    }
    if overrides.insecure {
        profile.insecure = Some(true);
    }

    let auth = match overrides.api_key {
        Some(key) => AuthCredentials::ApiKey(key),
        None => resolve_auth(&profile, &name, overrides.totp)?,
    };
    debug!(profile = %name, panel = %profile.panel, "resolved panel config");
    build_panel_config(&profile, &config.defaults, auth)
}

impl Profile {
    fn ad_hoc(panel: String) -> Self {
        Self {
            panel,
            auth_mode: default_auth_mode(),
            api_key: None,
            api_key_env: Some("HOSTDECK_API_KEY".into()),
            username: None,
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(auth_mode: &str) -> Profile {
        Profile {
            panel: "https://panel.example.com".into(),
            auth_mode: auth_mode.into(),
            api_key: Some("ptlc_plain".into()),
            api_key_env: None,
            username: Some("alice".into()),
            password: Some("hunter2".into()),
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    fn config_with(name: &str, p: Profile) -> Config {
        Config {
            default_profile: Some(name.into()),
            profiles: HashMap::from([(name.to_owned(), p)]),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_poll_every_thirty_seconds() {
        let d = Defaults::default();
        assert_eq!(d.poll_interval_secs, 30);
        assert_eq!(d.telemetry_on_error, FailurePolicy::Clear);
    }

    #[test]
    fn plaintext_api_key_is_last_resort() {
        let key = resolve_api_key(&profile("api_key"), "hostdeck-test-plaintext").unwrap();
        assert_eq!(key.expose_secret(), "ptlc_plain");
    }

    #[test]
    fn missing_api_key_is_reported() {
        let mut p = profile("api_key");
        p.api_key = None;
        let err = resolve_api_key(&p, "hostdeck-test-missing").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn unknown_auth_mode_is_rejected() {
        let err = resolve_auth(&profile("oauth"), "x", None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "auth_mode"));
    }

    #[test]
    fn session_profile_carries_totp() {
        let auth = resolve_auth(
            &profile("session"),
            "hostdeck-test-session",
            Some(SecretString::from("123456")),
        )
        .unwrap();
        let AuthCredentials::Session { totp, .. } = auth else {
            panic!("expected session credentials");
        };
        assert_eq!(totp.unwrap().expose_secret(), "123456");
    }

    #[test]
    fn invalid_panel_url_is_a_validation_error() {
        let mut p = profile("api_key");
        p.panel = "not a url".into();
        let err = profile_to_panel_config(&p, "x", &Defaults::default(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "panel"));
    }

    #[test]
    fn profile_and_defaults_shape_panel_config() {
        let mut p = profile("api_key");
        p.ca_cert = Some(PathBuf::from("/etc/panel-ca.pem"));
        p.timeout = Some(5);
        let defaults = Defaults {
            poll_interval_secs: 10,
            telemetry_on_error: FailurePolicy::Keep,
            ..Defaults::default()
        };

        let cfg = profile_to_panel_config(&p, "hostdeck-test-shape", &defaults, None).unwrap();
        assert_eq!(cfg.tls, TlsVerification::CustomCa("/etc/panel-ca.pem".into()));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.on_failure, FailurePolicy::Keep);
    }

    #[test]
    fn cli_overrides_win_over_profile() {
        let config = config_with("home", profile("session"));
        let cfg = resolve_panel_config(
            &config,
            Overrides {
                panel: Some("https://other.example.com".into()),
                api_key: Some(SecretString::from("ptlc_cli")),
                insecure: true,
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(cfg.url.as_str(), "https://other.example.com/");
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        let AuthCredentials::ApiKey(key) = cfg.auth else {
            panic!("expected api key");
        };
        assert_eq!(key.expose_secret(), "ptlc_cli");
    }

    #[test]
    fn missing_profile_and_panel() {
        assert!(matches!(
            resolve_panel_config(&Config::default(), Overrides::default()),
            Err(ConfigError::NoPanel)
        ));
        assert!(matches!(
            resolve_panel_config(
                &Config::default(),
                Overrides {
                    profile: Some("nope".into()),
                    ..Overrides::default()
                }
            ),
            Err(ConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn config_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = config_with("home", profile("session"));

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.default_profile.as_deref(), Some("home"));
        let home = &loaded.profiles["home"];
        assert_eq!(home.auth_mode, "session");
        assert_eq!(home.username.as_deref(), Some("alice"));
        assert_eq!(loaded.defaults.poll_interval_secs, 30);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\ntelemetry_on_error = \"keep\"\n\n[profiles.lab]\npanel = \"https://lab.local\"\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.telemetry_on_error, FailurePolicy::Keep);
        assert_eq!(loaded.defaults.timeout, 30);
        assert_eq!(loaded.profiles["lab"].auth_mode, "api_key");
    }
}
