//! `hostdeck-tui`: terminal dashboard for a game-server hosting panel.
//!
//! Lists the servers visible to the signed-in account one page at a time
//! and polls each visible server's resource usage in the background.
//!
//! Logs go to a file (default `/tmp/hostdeck-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hostdeck_config::Overrides;
use hostdeck_core::{Location, PreferenceStore};

use crate::app::App;

/// Terminal dashboard for game-server hosting panels.
#[derive(Parser, Debug)]
#[command(name = "hostdeck-tui", version, about)]
struct Cli {
    /// Panel URL (e.g. https://panel.example.com)
    #[arg(short = 'u', long, env = "HOSTDECK_PANEL")]
    panel: Option<String>,

    /// Client API key
    #[arg(short = 'k', long, env = "HOSTDECK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Config profile to use
    #[arg(short, long, env = "HOSTDECK_PROFILE")]
    profile: Option<String>,

    /// Two-factor code for session logins
    #[arg(long, env = "HOSTDECK_TOTP", hide_env_values = true)]
    totp: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Page to open, as a panel path such as `/?page=3`
    #[arg(long, default_value = "/")]
    location: String,

    /// Log file path
    #[arg(long, default_value = "/tmp/hostdeck-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard flushes on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hostdeck_tui={level},hostdeck_core={level},hostdeck_api={level}"
        ))
    });

    let dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let file_name = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("hostdeck-tui.log"));

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config = hostdeck_config::load_config_or_default();
    let overrides = Overrides {
        profile: cli.profile.clone(),
        panel: cli.panel.clone(),
        api_key: cli.api_key.clone().map(SecretString::from),
        totp: cli.totp.clone().map(SecretString::from),
        insecure: cli.insecure,
    };
    let panel_config = hostdeck_config::resolve_panel_config(&config, overrides)?;
    info!(panel = %panel_config.url, "starting hostdeck-tui");

    let preferences = Arc::new(PreferenceStore::open(hostdeck_config::preferences_path()));
    let location = Location::parse(&cli.location);
    let mut app = App::new(panel_config, preferences, &location);
    app.run().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn location_flag_selects_page() {
        let cli = Cli::try_parse_from(["hostdeck-tui", "--location", "/?page=4"]).unwrap();
        assert_eq!(Location::parse(&cli.location).page(), 4);

        let cli = Cli::try_parse_from(["hostdeck-tui"]).unwrap();
        assert_eq!(Location::parse(&cli.location).page(), 1);
    }
}
