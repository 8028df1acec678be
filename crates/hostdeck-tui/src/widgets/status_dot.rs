//! Server status dot. Transitioning states pulse between two glyphs.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use hostdeck_core::DisplayStatus;

use crate::theme;

pub fn status_char(status: DisplayStatus, pulse: bool) -> &'static str {
    if status.is_transitioning() {
        if pulse { "◐" } else { "◑" }
    } else if status.is_suspended() {
        "◌"
    } else {
        "●"
    }
}

pub fn status_span(status: DisplayStatus, pulse: bool) -> Span<'static> {
    let mut style = Style::default().fg(theme::status_color(status.status()));
    if status.is_transitioning() && !pulse {
        style = style.add_modifier(Modifier::DIM);
    }
    Span::styled(status_char(status, pulse), style)
}
