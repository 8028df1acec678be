// ── Panel facade ──
//
// Authenticated connection to one panel. Cheap to clone; implements both
// data-source traits so the list controller and the pollers can share it.

use std::sync::Arc;

use hostdeck_api::{LoginRequest, PanelClient, ServerScope};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::{LoginFlow, LoginStep, SubmitAction, validate_credentials};
use crate::config::{AuthCredentials, PanelConfig};
use crate::error::CoreError;
use crate::model::{EntityPage, TelemetrySample, UserContext};
use crate::notify::Notifications;
use crate::poller::{EntitySource, PollerConfig, TelemetrySource};

struct PanelInner {
    config: PanelConfig,
    client: PanelClient,
    user: UserContext,
}

/// A connected panel.
#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

impl Panel {
    /// Authenticate and load the current account.
    ///
    /// Session logins that hit a two-factor checkpoint use the configured
    /// TOTP code, failing with [`CoreError::TwoFactorRequired`] if none is
    /// set. Login errors are also posted to `notifications`.
    pub async fn connect(
        config: PanelConfig,
        notifications: &Notifications,
    ) -> Result<Self, CoreError> {
        let transport = config.transport();
        let client = match &config.auth {
            AuthCredentials::ApiKey(key) => {
                PanelClient::from_api_key(config.url.as_str(), key, &transport)?
            }
            AuthCredentials::Session {
                username,
                password,
                totp,
            } => {
                let client = PanelClient::with_session(config.url.as_str(), &transport)?;
                session_login(&client, username, password, totp.as_ref(), notifications).await?;
                client
            }
        };

        let user: UserContext = client.get_account().await?.into();
        info!(
            panel = %config.url,
            user = %user.username,
            root_admin = user.root_admin,
            "connected"
        );

        Ok(Self {
            inner: Arc::new(PanelInner {
                config,
                client,
                user,
            }),
        })
    }

    pub fn user(&self) -> &UserContext {
        &self.inner.user
    }

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &Url {
        self.inner.client.base_url()
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig::from(&self.inner.config)
    }

    /// End the session, if there is one. Errors are logged, not returned.
    pub async fn disconnect(&self) {
        if !self.inner.client.is_session() {
            return;
        }
        match self.inner.client.logout().await {
            Ok(()) => info!("logged out"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
    }
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("url", &self.inner.config.url.as_str())
            .field("user", &self.inner.user.username)
            .finish_non_exhaustive()
    }
}

async fn session_login(
    client: &PanelClient,
    username: &str,
    password: &SecretString,
    totp: Option<&SecretString>,
    notifications: &Notifications,
) -> Result<(), CoreError> {
    let mut flow = LoginFlow::new(false, notifications.clone());
    let missing = validate_credentials(username, password.expose_secret());
    if !missing.is_empty() {
        let err = CoreError::AuthenticationFailed {
            message: missing.join(" "),
        };
        flow.login_failed(&err);
        return Err(err);
    }
    let challenge_response = match flow.submit() {
        SubmitAction::SendLogin { challenge_response } => challenge_response,
        SubmitAction::ExecuteChallenge => {
            return Err(CoreError::AuthenticationFailed {
                message: "panel requires a challenge response".into(),
            });
        }
    };

    let request = LoginRequest {
        user: username,
        password,
        challenge_response: challenge_response.as_deref(),
    };
    let outcome = match client.login(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = CoreError::from(e);
            flow.login_failed(&err);
            return Err(err);
        }
    };

    let LoginStep::Checkpoint { confirmation_token } = flow.login_succeeded(outcome).clone()
    else {
        return Ok(());
    };

    let Some(code) = totp else {
        let err = CoreError::TwoFactorRequired;
        flow.login_failed(&err);
        return Err(err);
    };
    debug!("completing two-factor checkpoint");
    if let Err(e) = client.login_checkpoint(&confirmation_token, code).await {
        let err = CoreError::from(e);
        flow.login_failed(&err);
        return Err(err);
    }
    Ok(())
}

impl TelemetrySource for Panel {
    async fn fetch_telemetry(&self, server: Uuid) -> Result<TelemetrySample, CoreError> {
        let stats = self.inner.client.get_server_resources(&server).await?;
        Ok(stats.into())
    }
}

impl EntitySource for Panel {
    async fn list_servers(&self, page: u32, scope: ServerScope) -> Result<EntityPage, CoreError> {
        let list = self.inner.client.list_servers(page, scope).await?;
        Ok(list.into())
    }
}
