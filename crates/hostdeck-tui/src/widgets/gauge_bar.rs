//! Horizontal usage bars built from block characters.

use ratatui::text::{Line, Span};

use hostdeck_core::metrics::ResourceGauge;

use crate::theme;

/// `(filled, empty)` strings of `█`/`░` spanning `width` cells for a
/// fraction in `[0, 1]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn bar_segments(fraction: f64, width: u16) -> (String, String) {
    let clamped = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((clamped * f64::from(width)).round() as u16).min(width);
    (
        "█".repeat(usize::from(filled)),
        "░".repeat(usize::from(width - filled)),
    )
}

/// Styled bar for a gauge; red once the gauge is in alarm.
pub fn bar_line(gauge: &ResourceGauge, width: u16) -> Line<'static> {
    let (filled, empty) = bar_segments(gauge.fraction, width);
    Line::from(vec![
        Span::styled(filled, theme::bar_fill(gauge.is_alarm())),
        Span::styled(empty, theme::bar_empty()),
    ])
}

/// `used / limit` caption under a bar.
pub fn caption_line(gauge: &ResourceGauge) -> Line<'static> {
    let style = if gauge.is_alarm() {
        theme::bar_fill(true)
    } else {
        theme::row_muted()
    };
    Line::from(Span::styled(gauge.to_string(), style))
}
