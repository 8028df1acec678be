// ── Core error types ──
//
// User-facing errors from hostdeck-core. Consumers never see raw HTTP
// plumbing; the `From<hostdeck_api::Error>` impl translates transport
// failures into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to panel at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Two-factor authentication code required")]
    TwoFactorRequired,

    #[error("Panel request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Not connected to a panel")]
    Disconnected,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Panel exception code (e.g. `DisplayException`), when provided.
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Preference store error: {message}")]
    Preferences { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text suitable for an inline notification.
    ///
    /// Panel API errors carry a human-readable detail; everything else
    /// falls back to the full display string.
    pub fn flash_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::AuthenticationFailed { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether re-authenticating could resolve this error.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::TwoFactorRequired
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hostdeck_api::Error> for CoreError {
    fn from(err: hostdeck_api::Error) -> Self {
        match err {
            hostdeck_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            hostdeck_api::Error::TwoFactorRequired => CoreError::TwoFactorRequired,
            hostdeck_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            hostdeck_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            hostdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            hostdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hostdeck_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            hostdeck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            hostdeck_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                code: Some("rate_limited".into()),
                status: Some(429),
            },
            hostdeck_api::Error::Api {
                message,
                code,
                status: 404,
            } => CoreError::NotFound {
                entity_type: code.unwrap_or_else(|| "resource".into()),
                identifier: message,
            },
            hostdeck_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            hostdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
