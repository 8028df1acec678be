// ── Metrics formatting ──
//
// Pure helpers turning raw counters into display strings and bar
// fractions. Units are binary (1 KiB = 1024 bytes).

use std::fmt;

use crate::model::{Limits, TelemetrySample};

const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Bar fraction at or above which a resource is shown in alarm colours.
pub const ALARM_THRESHOLD: f64 = 0.90;

/// Human-readable byte count with two decimals, e.g. `900.00 MiB`.
///
/// Values below one KiB are printed as a whole number of bytes.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} Bytes");
    }
    let mut value = bytes as f64;
    let mut label = UNITS[0];
    for unit in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        label = unit;
    }
    format!("{value:.2} {label}")
}

/// Convert a MiB limit to bytes.
pub fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

/// Percentage with two decimals, e.g. `95.50%`.
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.2}%")
}

/// Filled fraction of a usage bar, clamped to `[0, 1]`.
///
/// An unlimited resource (limit 0) always yields an empty bar.
pub fn bar_fraction(usage: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    (usage / limit).clamp(0.0, 1.0)
}

pub fn is_alarm(fraction: f64) -> bool {
    fraction >= ALARM_THRESHOLD
}

/// Compact uptime, e.g. `3d 4h`, `4h 23m`, `12m`.
pub fn format_uptime(ms: u64) -> String {
    let secs = ms / 1000;
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}

// ── Resource gauges ──────────────────────────────────────────────────

/// Which limited resource a gauge describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ResourceKind {
    #[strum(serialize = "CPU")]
    Cpu,
    #[strum(serialize = "Memory")]
    Memory,
    #[strum(serialize = "Disk")]
    Disk,
}

/// Usage against a limit, ready to render as text plus a bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGauge {
    pub kind: ResourceKind,
    /// Formatted usage, e.g. `900.00 MiB`.
    pub used: String,
    /// Formatted limit: `1.00 GiB`, `100%`, `Unlimited`, or `∞`.
    pub limit: String,
    pub fraction: f64,
}

impl ResourceGauge {
    /// CPU usage in percent of one core against a percent limit.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn cpu(usage_percent: f64, limit_percent: u64) -> Self {
        Self {
            kind: ResourceKind::Cpu,
            used: format_percent(usage_percent),
            limit: if limit_percent == 0 {
                "∞".into()
            } else {
                format!("{limit_percent}%")
            },
            fraction: bar_fraction(usage_percent, limit_percent as f64),
        }
    }

    pub fn memory(usage_bytes: u64, limit_mb: u64) -> Self {
        Self::bytes(ResourceKind::Memory, usage_bytes, limit_mb)
    }

    pub fn disk(usage_bytes: u64, limit_mb: u64) -> Self {
        Self::bytes(ResourceKind::Disk, usage_bytes, limit_mb)
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn bytes(kind: ResourceKind, usage_bytes: u64, limit_mb: u64) -> Self {
        let limit_bytes = mb_to_bytes(limit_mb);
        Self {
            kind,
            used: format_bytes(usage_bytes),
            limit: if limit_mb == 0 {
                "Unlimited".into()
            } else {
                format_bytes(limit_bytes)
            },
            fraction: bar_fraction(usage_bytes as f64, limit_bytes as f64),
        }
    }

    /// All three gauges for a sample, in display order (CPU, memory, disk).
    pub fn for_sample(sample: &TelemetrySample, limits: &Limits) -> [Self; 3] {
        [
            Self::cpu(sample.cpu_usage_percent, limits.cpu_percent),
            Self::memory(sample.memory_usage_bytes, limits.memory_mb),
            Self::disk(sample.disk_usage_bytes, limits.disk_mb),
        ]
    }

    pub fn is_alarm(&self) -> bool {
        is_alarm(self.fraction)
    }
}

impl fmt::Display for ResourceGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.used, self.limit)
    }
}
