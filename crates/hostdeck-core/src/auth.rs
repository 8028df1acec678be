// ── Login flow ──
//
// Client-side state for a session login: whether a challenge response is
// still needed, what to send, and where to go afterwards. Network calls
// are made by the caller (see `Panel::connect`); this type only decides.

use hostdeck_api::LoginOutcome;
use tracing::debug;

use crate::error::CoreError;
use crate::notify::Notifications;

/// Notification scope for login errors.
pub const AUTH_SCOPE: &str = "auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// Waiting for the user to submit.
    Idle,
    /// The challenge widget is running; submission resumes once it verifies.
    AwaitingChallenge,
    /// Login request in flight.
    Submitting,
    /// Two-factor code needed to finish.
    Checkpoint { confirmation_token: String },
    /// Logged in; go to `redirect`.
    Complete { redirect: String },
}

/// What the caller should do after [`LoginFlow::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// Run the challenge first, then call [`LoginFlow::challenge_verified`].
    ExecuteChallenge,
    /// Send the login request with this challenge response.
    SendLogin { challenge_response: Option<String> },
}

/// Form validation messages for empty fields.
pub fn validate_credentials(username: &str, password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push("A username or email must be provided.");
    }
    if password.is_empty() {
        errors.push("Please enter your account password.");
    }
    errors
}

pub struct LoginFlow {
    challenge_enabled: bool,
    token: Option<String>,
    /// Bumped whenever the challenge widget must be reset.
    challenge_resets: u32,
    step: LoginStep,
    notifications: Notifications,
}

impl LoginFlow {
    /// Start a fresh flow. Clears any leftover notifications.
    pub fn new(challenge_enabled: bool, notifications: Notifications) -> Self {
        notifications.clear_all();
        Self {
            challenge_enabled,
            token: None,
            challenge_resets: 0,
            step: LoginStep::Idle,
            notifications,
        }
    }

    pub fn step(&self) -> &LoginStep {
        &self.step
    }

    pub fn has_challenge_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn challenge_resets(&self) -> u32 {
        self.challenge_resets
    }

    /// Begin a submission.
    pub fn submit(&mut self) -> SubmitAction {
        self.notifications.clear_all();
        if self.challenge_enabled && self.token.is_none() {
            self.step = LoginStep::AwaitingChallenge;
            return SubmitAction::ExecuteChallenge;
        }
        self.step = LoginStep::Submitting;
        SubmitAction::SendLogin {
            challenge_response: self.token.clone(),
        }
    }

    // The challenge hooks below are driven by front ends that render a
    // challenge widget. `Panel::connect` logs in with the challenge off.

    /// Challenge passed; submission continues with its token.
    pub fn challenge_verified(&mut self, token: String) -> SubmitAction {
        self.token = Some(token);
        self.submit()
    }

    /// Challenge token expired before use.
    pub fn challenge_expired(&mut self) {
        self.token = None;
        self.step = LoginStep::Idle;
    }

    /// The challenge widget itself failed.
    pub fn challenge_failed(&mut self, error: &CoreError) {
        self.step = LoginStep::Idle;
        self.notifications.clear_and_add_error(AUTH_SCOPE, error);
    }

    pub fn login_succeeded(&mut self, outcome: LoginOutcome) -> &LoginStep {
        self.step = match outcome {
            LoginOutcome::Complete { intended } => LoginStep::Complete {
                redirect: intended.unwrap_or_else(|| "/".into()),
            },
            LoginOutcome::Checkpoint { confirmation_token } => {
                LoginStep::Checkpoint { confirmation_token }
            }
        };
        debug!(step = ?self.step, "login step advanced");
        &self.step
    }

    /// Login rejected: drop the used token, reset the challenge, and show
    /// the error.
    pub fn login_failed(&mut self, error: &CoreError) {
        self.token = None;
        if self.challenge_enabled {
            self.challenge_resets += 1;
        }
        self.step = LoginStep::Idle;
        self.notifications.clear_and_add_error(AUTH_SCOPE, error);
    }
}
