// ── Domain model ──
//
// Canonical types the dashboard works with. Wire shapes live in
// hostdeck-api; `crate::convert` maps them here.

pub mod page;
pub mod server;
pub mod telemetry;
pub mod user;

pub use page::{EntityPage, PageInfo};
pub use server::{Limits, Server, ServerStatus};
pub use telemetry::TelemetrySample;
pub use user::UserContext;
