//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

use hostdeck_core::{FlashLevel, ServerStatus};

pub const ACCENT: Color = Color::Rgb(96, 165, 250); // #60a5fa
pub const CYAN: Color = Color::Rgb(103, 232, 249); // #67e8f9
pub const SUCCESS_GREEN: Color = Color::Rgb(74, 222, 128); // #4ade80
pub const WARNING_YELLOW: Color = Color::Rgb(250, 204, 21); // #facc15
pub const ERROR_RED: Color = Color::Rgb(248, 113, 113); // #f87171

pub const TEXT: Color = Color::Rgb(229, 231, 235); // #e5e7eb
pub const MUTED: Color = Color::Rgb(156, 163, 175); // #9ca3af
pub const BAR_EMPTY: Color = Color::Rgb(55, 65, 81); // #374151
pub const BG_DARK: Color = Color::Rgb(17, 24, 39); // #111827
pub const BG_HIGHLIGHT: Color = Color::Rgb(31, 41, 55); // #1f2937

pub fn title_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn row_text() -> Style {
    Style::default().fg(TEXT)
}

pub fn row_muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn row_selected() -> Style {
    Style::default().bg(BG_HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

/// Status-dot colour.
pub fn status_color(status: ServerStatus) -> Color {
    match status {
        ServerStatus::Running => SUCCESS_GREEN,
        ServerStatus::Offline | ServerStatus::Suspended => ERROR_RED,
        ServerStatus::Starting | ServerStatus::Stopping => WARNING_YELLOW,
    }
}

/// Filled part of a usage bar.
pub fn bar_fill(alarm: bool) -> Style {
    Style::default().fg(if alarm { ERROR_RED } else { ACCENT })
}

pub fn bar_empty() -> Style {
    Style::default().fg(BAR_EMPTY)
}

pub fn flash_style(level: FlashLevel) -> Style {
    let color = match level {
        FlashLevel::Info => ACCENT,
        FlashLevel::Success => SUCCESS_GREEN,
        FlashLevel::Warning => WARNING_YELLOW,
        FlashLevel::Error => ERROR_RED,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn badge(color: Color) -> Style {
    Style::default()
        .fg(BG_DARK)
        .bg(color)
        .add_modifier(Modifier::BOLD)
}
