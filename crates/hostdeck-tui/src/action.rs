//! UI actions. Every state change in the app goes through one of these.

use std::sync::Arc;

use hostdeck_core::{EntityPage, Flash, Panel};

/// Requests from the UI to the data bridge, which owns the list controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectPage(u32),
    ToggleScope,
    Refresh,
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    /// Dismiss the newest notification.
    DismissFlash,

    // ── Data bridge → UI ──
    Connecting,
    Connected(Arc<Panel>),
    ConnectFailed(String),
    /// A page arrived from the controller.
    PageLoaded {
        page: Arc<EntityPage>,
        admin_scope: bool,
        location: String,
    },
    /// The page request failed; the error is already in the notifications.
    /// `location` reflects the page the controller now points at.
    PageFailed { location: String },
    FlashesChanged(Vec<Flash>),

    // ── UI → data bridge ──
    Command(Command),
}
