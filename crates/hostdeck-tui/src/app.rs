//! Application core: event loop, key routing, and frame layout.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hostdeck_core::{Flash, Location, Notifications, PanelConfig, PreferenceStore};

use crate::action::{Action, Command};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screens::servers::ServersScreen;
use crate::theme;
use crate::tui::Tui;

const BRIDGE_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Failed,
}

pub struct App {
    servers: ServersScreen,
    running: bool,
    connection: ConnectionStatus,
    help_visible: bool,
    /// Mirrors the list controller's location (`/` or `/?page=N`).
    location: String,
    flashes: Vec<Flash>,
    notifications: Notifications,
    preferences: Arc<PreferenceStore>,
    panel_config: Option<PanelConfig>,
    initial_location: Location,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: Option<mpsc::UnboundedReceiver<Command>>,
}

impl App {
    /// `location` is where the list opens, e.g. `/?page=3`. Invalid pages
    /// normalize to the first.
    pub fn new(
        panel_config: PanelConfig,
        preferences: Arc<PreferenceStore>,
        location: &Location,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let initial_location = Location::for_page(location.page());
        Self {
            servers: ServersScreen::new(),
            running: true,
            connection: ConnectionStatus::default(),
            help_visible: false,
            location: initial_location.to_string(),
            flashes: Vec::new(),
            notifications: Notifications::new(),
            preferences,
            panel_config: Some(panel_config),
            initial_location,
            action_tx,
            action_rx,
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let cancel = CancellationToken::new();
        let bridge = match (self.panel_config.take(), self.command_rx.take()) {
            (Some(config), Some(commands)) => Some(tokio::spawn(spawn_data_bridge(
                config,
                self.initial_location.clone(),
                Arc::clone(&self.preferences),
                self.notifications.clone(),
                self.action_tx.clone(),
                commands,
                cancel.clone(),
            ))),
            _ => None,
        };

        let mut tui = Tui::new()?;
        tui.enter()?;
        debug!(size = ?tui.size().unwrap_or((80, 24)), "terminal ready");

        let mut events = EventReader::new(Duration::from_millis(250), Duration::from_millis(33));
        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        cancel.cancel();
        if let Some(handle) = bridge {
            if tokio::time::timeout(BRIDGE_SHUTDOWN_TIMEOUT, handle)
                .await
                .is_err()
            {
                warn!("data bridge did not shut down in time");
            }
        }
        info!("event loop ended");
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('x')) if !self.flashes.is_empty() => {
                return Ok(Some(Action::DismissFlash));
            }
            _ => {}
        }

        self.servers.handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Render | Action::Resize(..) => {}
            Action::DismissFlash => {
                if let Some(flash) = self.flashes.last() {
                    self.notifications.dismiss(flash.id);
                }
            }
            Action::FlashesChanged(flashes) => self.flashes.clone_from(flashes),
            Action::Command(command) => {
                if self.command_tx.send(*command).is_err() {
                    debug!(?command, "data bridge gone, dropping command");
                    return Ok(());
                }
                self.forward(action)?;
            }
            other => {
                match other {
                    Action::Connecting => self.connection = ConnectionStatus::Connecting,
                    Action::Connected(_) => self.connection = ConnectionStatus::Connected,
                    Action::ConnectFailed(_) => self.connection = ConnectionStatus::Failed,
                    Action::PageLoaded { location, .. } | Action::PageFailed { location } => {
                        self.location.clone_from(location);
                    }
                    _ => {}
                }
                self.forward(other)?;
            }
        }
        Ok(())
    }

    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.servers.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let flash_height = u16::from(!self.flashes.is_empty());
        let [content, flash, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(flash_height),
            Constraint::Length(1),
        ])
        .areas(area);

        self.servers.render(frame, content);
        if let Some(newest) = self.flashes.last() {
            render_flash(frame, flash, newest);
        }
        self.render_status_bar(frame, status);

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let indicator = match self.connection {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::WARNING_YELLOW))
            }
            ConnectionStatus::Failed => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
        };

        let mut spans = vec![
            Span::raw(" "),
            indicator,
            Span::styled(" │ ", theme::key_hint()),
            Span::styled(self.location.clone(), theme::key_hint_key()),
        ];
        if let Some(hint) = self.servers.status_hint() {
            spans.push(Span::styled(format!(" │ {hint}"), theme::key_hint()));
        }
        spans.push(Span::styled("  ? help  q quit", theme::key_hint()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn render_flash(frame: &mut Frame, area: Rect, flash: &Flash) {
    let line = Line::from(vec![
        Span::styled(format!(" {} ", flash.level), theme::flash_style(flash.level)),
        Span::styled(flash.message.clone(), theme::row_text()),
        Span::styled("  x dismiss", theme::key_hint()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 46u16.min(area.width.saturating_sub(4));
    let height = 15u16.min(area.height.saturating_sub(2));
    let help_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };
    let lines = vec![
        Line::from(""),
        entry("←/→ h/l", "Previous / next page"),
        entry("g", "First page"),
        entry("j/k ↑/↓", "Move selection"),
        entry("a", "Toggle all servers (admin)"),
        entry("r", "Refresh"),
        entry("x", "Dismiss notification"),
        entry("?", "This help"),
        entry("q Ctrl+c", "Quit"),
        Line::from(""),
        Line::from(Span::styled("          Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hostdeck_core::AuthCredentials;
    use pretty_assertions::assert_eq;

    use super::*;

    fn app_at(href: &str) -> App {
        let config = PanelConfig::new(
            "https://panel.example.com".parse().unwrap(),
            AuthCredentials::ApiKey("ptlc_test".to_string().into()),
        );
        App::new(
            config,
            Arc::new(PreferenceStore::in_memory()),
            &Location::parse(href),
        )
    }

    #[test]
    fn opens_at_requested_page() {
        assert_eq!(app_at("/?page=3").location, "/?page=3");
        assert_eq!(app_at("/?page=0").location, "/");
        assert_eq!(app_at("/").location, "/");
    }

    #[test]
    fn failed_page_still_moves_location() {
        let mut app = app_at("/");
        app.process_action(&Action::Command(Command::SelectPage(3)))
            .unwrap();
        app.process_action(&Action::PageFailed {
            location: "/?page=3".into(),
        })
        .unwrap();
        assert_eq!(app.location, "/?page=3");
    }
}
