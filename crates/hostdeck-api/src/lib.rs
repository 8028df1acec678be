// hostdeck-api: Async Rust client for the hosting panel client API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod servers;
pub mod transport;

pub use auth::{LoginOutcome, LoginRequest};
pub use client::PanelClient;
pub use error::Error;
pub use models::{
    AccountAttributes, ListResponse, Pagination, ServerAttributes, ServerLimits, ServerScope,
    StatsAttributes, StatsResources,
};
pub use transport::{TlsMode, TransportConfig};
