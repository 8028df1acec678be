//! Component trait implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// Lifecycle: (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Map a key press to an action, or `None` if the key is not ours.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Apply an action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// Extra status-bar spans contributed by the screen.
    fn status_hint(&self) -> Option<String> {
        None
    }
}
