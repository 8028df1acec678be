use thiserror::Error;

/// Top-level error type for the `hostdeck-api` crate.
///
/// Covers every failure mode of the panel client API: authentication,
/// transport, structured API errors, and payload decoding.
/// `hostdeck-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, failed challenge, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Two-factor checkpoint required but no code was provided.
    #[error("Two-factor authentication code required")]
    TwoFactorRequired,

    /// Session cookie has expired or was revoked.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// API key rejected by the panel.
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Rate limited by the panel. Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// Structured error from the panel (`{"errors":[{code, status, detail}]}`).
    #[error("Panel API error (HTTP {status}): {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the panel's error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            message: "boom".into(),
            code: None,
            status: 502,
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_not_transient() {
        let err = Error::Api {
            message: "missing".into(),
            code: Some("NotFoundHttpException".into()),
            status: 404,
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
        assert_eq!(err.api_error_code(), Some("NotFoundHttpException"));
    }

    #[test]
    fn session_expiry_counts_as_auth_expired() {
        assert!(Error::SessionExpired.is_auth_expired());
        assert!(!Error::InvalidApiKey.is_auth_expired());
    }
}
