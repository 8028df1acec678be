//! Servers screen: one page of servers with live usage per row.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;
use tracing::debug;

use hostdeck_core::{
    PageInfo, PaginatedEntityView, Panel, RowBody, RowGauges, ServerRowView, ViewState,
};

use crate::action::{Action, Command};
use crate::component::Component;
use crate::theme;
use crate::widgets::{gauge_bar, status_dot};

const BAR_WIDTH: u16 = 14;

pub const SCOPE_ALL_LABEL: &str = "Showing all servers";
pub const SCOPE_OWN_LABEL: &str = "Showing your servers";

/// What the key handler needs to know about the current page.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavContext {
    pub pagination: Option<PageInfo>,
    pub can_toggle_scope: bool,
}

/// Page navigation and scope keys. Selection keys are handled by the screen.
pub fn nav_action(key: KeyEvent, ctx: NavContext) -> Option<Action> {
    if key.modifiers != KeyModifiers::NONE && key.modifiers != KeyModifiers::SHIFT {
        return None;
    }
    let command = match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            let page = ctx.pagination?;
            (page.current_page > 1)
                .then_some(Command::SelectPage(page.current_page.saturating_sub(1)))?
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let page = ctx.pagination?;
            (page.current_page < page.total_pages)
                .then_some(Command::SelectPage(page.current_page + 1))?
        }
        KeyCode::Char('g') => {
            let page = ctx.pagination?;
            (page.current_page != 1).then_some(Command::SelectPage(1))?
        }
        KeyCode::Char('a') if ctx.can_toggle_scope => Command::ToggleScope,
        KeyCode::Char('r') => Command::Refresh,
        _ => return None,
    };
    Some(Action::Command(command))
}

pub fn scope_label(admin_scope: bool) -> &'static str {
    if admin_scope {
        SCOPE_ALL_LABEL
    } else {
        SCOPE_OWN_LABEL
    }
}

pub struct ServersScreen {
    view: Option<PaginatedEntityView<Panel>>,
    panel_url: String,
    can_toggle_scope: bool,
    admin_scope: bool,
    /// A page request is in flight.
    busy: bool,
    connect_error: Option<String>,
    table_state: TableState,
    throbber_state: ThrobberState,
    ticks: u32,
}

impl ServersScreen {
    pub fn new() -> Self {
        Self {
            view: None,
            panel_url: String::new(),
            can_toggle_scope: false,
            admin_scope: false,
            busy: true,
            connect_error: None,
            table_state: TableState::default(),
            throbber_state: ThrobberState::default(),
            ticks: 0,
        }
    }

    fn pulse(&self) -> bool {
        (self.ticks / 2) % 2 == 0
    }

    fn nav_context(&self) -> NavContext {
        NavContext {
            pagination: self
                .view
                .as_ref()
                .and_then(|v| v.page())
                .map(|p| p.pagination),
            can_toggle_scope: self.can_toggle_scope,
        }
    }

    fn row_count(&self) -> usize {
        self.view
            .as_ref()
            .and_then(|v| v.page())
            .map_or(0, |p| p.items.len())
    }

    fn move_selection(&mut self, down: bool) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(count - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    fn title(&self, pagination: Option<PageInfo>) -> Line<'static> {
        let mut spans = vec![Span::styled(" Servers ", theme::title_style())];
        if self.can_toggle_scope {
            spans.push(Span::styled(
                format!("· {} ", scope_label(self.admin_scope)),
                theme::row_muted(),
            ));
        }
        if let Some(p) = pagination {
            spans.push(Span::styled(
                format!(
                    "· page {}/{} · {} total ",
                    p.current_page, p.total_pages, p.total_items
                ),
                theme::row_muted(),
            ));
        }
        if self.busy && pagination.is_some() {
            spans.push(Span::styled("⟳ ", theme::key_hint_key()));
        }
        Line::from(spans)
    }

    /// Render a view state inside the screen's frame.
    pub fn render_state(&self, frame: &mut Frame, area: Rect, state: &ViewState) {
        let pagination = self
            .view
            .as_ref()
            .and_then(|v| v.page())
            .map(|p| p.pagination);
        let block = Block::default()
            .title(self.title(pagination))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match state {
            ViewState::Loading => self.render_loading(frame, inner),
            ViewState::Empty {
                message,
                call_to_action,
            } => self.render_empty(frame, inner, message, call_to_action),
            ViewState::Rows(rows) => self.render_rows(frame, inner, rows),
        }
    }

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        if let Some(ref err) = self.connect_error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Could not connect: {err}"),
                    Style::default().fg(theme::ERROR_RED),
                ))
                .alignment(Alignment::Center),
                layout[1],
            );
            return;
        }

        let throbber = throbber_widgets_tui::Throbber::default()
            .label(" Loading servers...")
            .style(Style::default().fg(theme::TEXT))
            .throbber_style(Style::default().fg(theme::ACCENT));
        let [_, centre, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(22),
            Constraint::Fill(1),
        ])
        .areas(layout[1]);
        frame.render_stateful_widget(throbber, centre, &mut self.throbber_state.clone());
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, message: &str, call_to_action: &str) {
        let layout = Layout::vertical([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

        let mut lines = vec![
            Line::from(Span::styled(message.to_owned(), theme::row_text())),
            Line::from(""),
        ];
        let mut cta = vec![Span::styled(
            call_to_action.to_owned(),
            theme::key_hint_key().add_modifier(Modifier::UNDERLINED),
        )];
        if !self.panel_url.is_empty() {
            cta.push(Span::styled(format!("  {}", self.panel_url), theme::row_muted()));
        }
        lines.push(Line::from(cta));

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            layout[1],
        );
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect, rows: &[ServerRowView]) {
        let pulse = self.pulse();
        let header = Row::new(["", "Server", "CPU", "Memory", "Disk", "Network / Uptime"])
            .style(theme::title_style())
            .bottom_margin(1);

        let table_rows: Vec<Row> = rows.iter().map(|row| server_row(row, pulse)).collect();
        let widths = [
            Constraint::Length(2),
            Constraint::Min(20),
            Constraint::Length(BAR_WIDTH + 6),
            Constraint::Length(24),
            Constraint::Length(24),
            Constraint::Length(26),
        ];

        let table = Table::new(table_rows, widths)
            .header(header)
            .row_highlight_style(theme::row_selected())
            .column_spacing(1);
        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }
}

impl Default for ServersScreen {
    fn default() -> Self {
        Self::new()
    }
}

fn server_row(row: &ServerRowView, pulse: bool) -> Row<'static> {
    let dot = Cell::from(status_dot::status_span(row.status, pulse));
    let name = Cell::from(Text::from(vec![
        Line::from(Span::styled(
            row.name.clone(),
            theme::row_text().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} · {}", row.id, row.node),
            theme::row_muted(),
        )),
    ]));

    let mut cells = vec![dot, name];
    match &row.body {
        RowBody::Gauges(gauges) => cells.extend(gauge_cells(gauges)),
        RowBody::Suspended => cells.push(Cell::from(Span::styled(
            " SUSPENDED ",
            theme::badge(theme::ERROR_RED),
        ))),
        RowBody::Transferring => cells.push(Cell::from(Span::styled(
            " TRANSFERRING ",
            theme::badge(theme::WARNING_YELLOW),
        ))),
        RowBody::Loading => cells.push(Cell::from(Span::styled("loading…", theme::row_muted()))),
    }
    Row::new(cells).height(2)
}

fn gauge_cells(gauges: &RowGauges) -> Vec<Cell<'static>> {
    let mut cells: Vec<Cell> = [&gauges.cpu, &gauges.memory, &gauges.disk]
        .into_iter()
        .map(|gauge| {
            Cell::from(Text::from(vec![
                gauge_bar::bar_line(gauge, BAR_WIDTH),
                gauge_bar::caption_line(gauge),
            ]))
        })
        .collect();
    cells.push(Cell::from(Text::from(vec![
        Line::from(Span::styled(
            format!("↓ {}  ↑ {}", gauges.network_rx, gauges.network_tx),
            theme::row_text(),
        )),
        Line::from(Span::styled(
            format!("up {}", gauges.uptime),
            theme::row_muted(),
        )),
    ])));
    cells
}

impl Component for ServersScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(true);
                Ok(None)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(false);
                Ok(None)
            }
            _ => Ok(nav_action(key, self.nav_context())),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Connected(panel) => {
                self.panel_url = panel.base_url().to_string();
                self.can_toggle_scope = panel.user().root_admin;
                self.view = Some(PaginatedEntityView::new(
                    Arc::clone(panel),
                    panel.poller_config(),
                ));
            }
            Action::ConnectFailed(message) => {
                self.busy = false;
                self.connect_error = Some(message.clone());
            }
            Action::PageLoaded {
                page, admin_scope, ..
            } => {
                self.busy = false;
                self.admin_scope = *admin_scope;
                if let Some(view) = self.view.as_mut() {
                    let report = view.set_page(Arc::clone(page), *admin_scope);
                    if !report.is_noop() {
                        debug!(
                            started = report.started.len(),
                            stopped = report.stopped.len(),
                            restarted = report.restarted.len(),
                            "pollers reconciled"
                        );
                    }
                }
                let selected = match (self.table_state.selected(), page.items.len()) {
                    (_, 0) => None,
                    (Some(i), n) => Some(i.min(n - 1)),
                    (None, _) => Some(0),
                };
                self.table_state.select(selected);
            }
            Action::PageFailed { .. } => self.busy = false,
            Action::Command(_) => self.busy = true,
            Action::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let state = self
            .view
            .as_ref()
            .map_or(ViewState::Loading, PaginatedEntityView::render);
        self.render_state(frame, area, &state);
    }

    fn status_hint(&self) -> Option<String> {
        let mut hint = String::from("←/→ page  g first  r refresh");
        if self.can_toggle_scope {
            hint.push_str("  a scope");
        }
        Some(hint)
    }
}
