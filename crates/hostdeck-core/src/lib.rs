//! Live dashboard layer between `hostdeck-api` and the terminal UI.
//!
//! - **[`Panel`]** connects (API key or session login with optional TOTP
//!   checkpoint), loads the current account, and serves as both the
//!   [`EntitySource`] for server pages and the [`TelemetrySource`] for
//!   per-server resource usage.
//!
//! - **[`EntityListController`]** owns the page number, the persisted
//!   per-user admin-scope flag, and the location string that mirrors the
//!   page. Empty pages past the first self-correct back to page 1.
//!
//! - **[`TelemetryPoller`]** fetches one server's usage immediately and then
//!   on a fixed interval. [`PollerRegistry`] keeps exactly one poller per
//!   visible, pollable server and tears pollers down as servers leave view
//!   or become suspended or transferring.
//!
//! - **[`PaginatedEntityView`]** combines a page with live samples through
//!   [`status::resolve`] and the [`metrics`] formatters into row view models.

pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod listing;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod panel;
pub mod poller;
pub mod preferences;
pub mod status;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{LoginFlow, LoginStep, SubmitAction};
pub use config::{AuthCredentials, FailurePolicy, PanelConfig, TlsVerification};
pub use error::CoreError;
pub use listing::{EntityListController, Location};
pub use model::{EntityPage, Limits, PageInfo, Server, ServerStatus, TelemetrySample, UserContext};
pub use notify::{Flash, FlashLevel, Notifications};
pub use panel::Panel;
pub use poller::{
    EntitySource, PollerConfig, PollerRegistry, ReconcileReport, TelemetryPoller, TelemetrySource,
};
pub use preferences::PreferenceStore;
pub use status::DisplayStatus;
pub use view::{PaginatedEntityView, RowBody, RowGauges, ServerRowView, ViewState};

pub use hostdeck_api::{LoginOutcome, ServerScope};
