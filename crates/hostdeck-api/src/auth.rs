// Session authentication
//
// Cookie-based login against the panel's web auth routes. The flow is
// `GET sanctum/csrf-cookie` (seeds the XSRF cookie), then
// `POST auth/login`. Accounts with two-factor enabled get a confirmation
// token back and must finish at `POST auth/login/checkpoint`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::PanelClient;
use crate::error::Error;

/// Credentials for a session login.
#[derive(Debug, Clone)]
pub struct LoginRequest<'a> {
    /// Username or email.
    pub user: &'a str,
    pub password: &'a SecretString,
    /// Response token from the CAPTCHA challenge, when the panel has one enabled.
    pub challenge_response: Option<&'a str>,
}

/// Result of a successful login POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session established. `intended` is where the panel wants the user next.
    Complete { intended: Option<String> },
    /// Two-factor checkpoint required before the session is usable.
    Checkpoint { confirmation_token: String },
}

#[derive(Deserialize)]
struct LoginEnvelope {
    data: LoginData,
}

#[derive(Deserialize)]
struct LoginData {
    #[serde(default)]
    complete: bool,
    #[serde(default)]
    intended: Option<String>,
    #[serde(default)]
    confirmation_token: Option<String>,
}

impl PanelClient {
    /// Authenticate with username/password.
    ///
    /// On success the session cookie is stored in the client's jar and
    /// used for all subsequent requests.
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginOutcome, Error> {
        if !self.is_session() {
            return Err(Error::Authentication {
                message: "login requires a session client".into(),
            });
        }

        let csrf_url = self.url("sanctum/csrf-cookie")?;
        debug!("seeding XSRF cookie at {csrf_url}");
        let resp = self.http().get(csrf_url).send().await?;
        self.handle_empty(resp).await?;

        let body = json!({
            "user": request.user,
            "password": request.password.expose_secret(),
            "g-recaptcha-response": request.challenge_response.unwrap_or_default(),
        });

        let envelope: LoginEnvelope = self
            .post("auth/login", &body)
            .await
            .map_err(into_auth_error)?;

        let outcome = login_outcome(envelope.data)?;
        match &outcome {
            LoginOutcome::Complete { .. } => info!(user = request.user, "login successful"),
            LoginOutcome::Checkpoint { .. } => {
                info!(user = request.user, "login requires two-factor checkpoint");
            }
        }
        Ok(outcome)
    }

    /// Complete a two-factor checkpoint with a TOTP code.
    ///
    /// Returns the panel's intended redirect target, if any.
    pub async fn login_checkpoint(
        &self,
        confirmation_token: &str,
        authentication_code: &SecretString,
    ) -> Result<Option<String>, Error> {
        let body = json!({
            "confirmation_token": confirmation_token,
            "authentication_code": authentication_code.expose_secret(),
        });

        let envelope: LoginEnvelope = self
            .post("auth/login/checkpoint", &body)
            .await
            .map_err(into_auth_error)?;

        if !envelope.data.complete {
            return Err(Error::Authentication {
                message: "two-factor checkpoint was not accepted".into(),
            });
        }
        info!("two-factor checkpoint complete");
        Ok(envelope.data.intended)
    }

    /// End the current session.
    pub async fn logout(&self) -> Result<(), Error> {
        self.post_no_response("auth/logout").await?;
        debug!("logout complete");
        Ok(())
    }
}

fn login_outcome(data: LoginData) -> Result<LoginOutcome, Error> {
    if data.complete {
        return Ok(LoginOutcome::Complete {
            intended: data.intended.filter(|s| !s.is_empty()),
        });
    }
    match data.confirmation_token {
        Some(confirmation_token) if !confirmation_token.is_empty() => {
            Ok(LoginOutcome::Checkpoint { confirmation_token })
        }
        _ => Err(Error::Authentication {
            message: "An error occurred while processing the login request.".into(),
        }),
    }
}

/// Login endpoints answer bad credentials with 4xx bodies; surface them
/// as authentication failures rather than generic API errors.
fn into_auth_error(err: Error) -> Error {
    match err {
        Error::Api { message, status, .. } if (400..500).contains(&status) => {
            Error::Authentication { message }
        }
        Error::SessionExpired | Error::InvalidApiKey => Error::Authentication {
            message: "credentials were rejected".into(),
        },
        other => other,
    }
}
