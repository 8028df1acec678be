// ── Server list state ──

mod controller;
mod location;

pub use controller::{EntityListController, FLASH_SCOPE, preference_key};
pub use location::{Location, parse_page_param};
