// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table, Tabs};
use rowdesk_app::format::cell_text;
use rowdesk_app::{
    ContactMap, DEFAULT_SEARCH_DEBOUNCE, DataSource, PlatformFilter, Projection, ProjectionSink,
    Row, TableSummary, ViewController, ViewEvent, ViewState, load_contacts_or_empty, load_page,
};
use serde_json::Value;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const PAGE_ROWS: isize = 20;
const HELP_TEXT: &str =
    "/ search | esc clear | v view | 0-3 platform | c column | j/k g/G | t tables | r reload | q quit";

/// Keeps the most recent projection for the next frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenSink {
    latest: Option<Projection>,
    published: u64,
}

impl ScreenSink {
    pub fn latest(&self) -> Option<&Projection> {
        self.latest.as_ref()
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}

impl ProjectionSink for ScreenSink {
    fn publish(&mut self, projection: &Projection) {
        self.latest = Some(projection.clone());
        self.published = self.published.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuiOptions {
    pub initial_table: Option<String>,
    pub search_debounce: Duration,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            initial_table: None,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Nav,
    Search,
    TablePicker,
}

struct ViewData {
    controller: ViewController<ScreenSink>,
    tables: Vec<TableSummary>,
    mode: InputMode,
    search_input: String,
    selected_row: usize,
    picker_cursor: usize,
    status: Option<String>,
    status_token: u64,
}

impl ViewData {
    fn new(search_debounce: Duration) -> Self {
        Self {
            controller: ViewController::new(ScreenSink::default(), search_debounce),
            tables: Vec::new(),
            mode: InputMode::Nav,
            search_input: String::new(),
            selected_row: 0,
            picker_cursor: 0,
            status: None,
            status_token: 0,
        }
    }

    fn projection(&self) -> Option<&Projection> {
        self.controller.sink().latest()
    }

    fn state(&self) -> &ViewState {
        self.controller.state()
    }

    fn row_count(&self) -> usize {
        self.projection()
            .map(|projection| projection.display_rows.len())
            .unwrap_or(0)
    }

    fn clamp_selection(&mut self) {
        self.selected_row = self.selected_row.min(self.row_count().saturating_sub(1));
    }
}

pub fn run_app<S: DataSource>(source: &mut S, options: &TuiOptions) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options.search_debounce);
    let (internal_tx, internal_rx) = mpsc::channel();
    bootstrap(
        source,
        &mut view_data,
        &internal_tx,
        options.initial_table.as_deref(),
    );

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);
        if view_data.controller.flush_search(Instant::now()) {
            view_data.clamp_selection();
        }

        if let Err(error) = terminal.draw(|frame| render(frame, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(source, &mut view_data, &internal_tx, key, Instant::now())
                    {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn bootstrap<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    initial_table: Option<&str>,
) {
    view_data
        .controller
        .set_contacts(load_contacts_or_empty(source));

    match source.list_tables() {
        Ok(tables) => view_data.tables = tables,
        Err(error) => {
            tracing::warn!("list tables failed: {error:#}");
            emit_status(view_data, internal_tx, format!("load tables failed: {error:#}"));
            return;
        }
    }

    let table = initial_table.map(str::to_owned).or_else(|| {
        view_data
            .tables
            .first()
            .map(|summary| summary.table_name.clone())
    });
    match table {
        Some(table) => open_table(source, view_data, internal_tx, &table),
        None => emit_status(view_data, internal_tx, "no tables"),
    }
}

fn open_table<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    table: &str,
) {
    match load_page(source, table) {
        Ok(page) => {
            let row_count = page.rows.len();
            view_data
                .controller
                .load_table(page.table, page.rows, page.columns);
            view_data.search_input.clear();
            view_data.selected_row = 0;
            emit_status(
                view_data,
                internal_tx,
                format!("loaded {table} ({row_count} rows)"),
            );
        }
        Err(error) => {
            tracing::warn!("{error:#}");
            emit_status(view_data, internal_tx, format!("load failed: {error:#}"));
        }
    }
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the user asked to quit.
fn handle_key_event<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match view_data.mode {
        InputMode::Nav => handle_nav_key(source, view_data, internal_tx, key),
        InputMode::Search => {
            handle_search_key(view_data, internal_tx, key, now);
            false
        }
        InputMode::TablePicker => {
            handle_picker_key(source, view_data, internal_tx, key);
            false
        }
    }
}

fn handle_nav_key<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => {
            view_data.search_input = view_data.controller.search_input().to_owned();
            view_data.mode = InputMode::Search;
        }
        KeyCode::Esc => {
            let events = view_data.controller.clear_filter();
            view_data.search_input.clear();
            after_view_events(view_data, internal_tx, &events);
        }
        KeyCode::Char('v') => {
            let events = view_data.controller.toggle_view_mode();
            after_view_events(view_data, internal_tx, &events);
        }
        KeyCode::Char(digit @ '0'..='3') => {
            let Some(platform) = platform_for_digit(digit) else {
                return false;
            };
            let events = view_data.controller.set_platform_filter(platform);
            after_view_events(view_data, internal_tx, &events);
        }
        KeyCode::Char('c') => {
            let events = view_data.controller.cycle_search_column();
            after_view_events(view_data, internal_tx, &events);
        }
        KeyCode::Char('j') | KeyCode::Down => move_row(view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(view_data, -1),
        KeyCode::PageDown => move_row(view_data, PAGE_ROWS),
        KeyCode::PageUp => move_row(view_data, -PAGE_ROWS),
        KeyCode::Char('g') => view_data.selected_row = 0,
        KeyCode::Char('G') => view_data.selected_row = view_data.row_count().saturating_sub(1),
        KeyCode::Char('t') => open_table_picker(source, view_data, internal_tx),
        KeyCode::Char('r') => reload(source, view_data, internal_tx),
        _ => {}
    }
    false
}

fn handle_search_key(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) {
    match key.code {
        KeyCode::Enter => view_data.mode = InputMode::Nav,
        KeyCode::Esc => {
            view_data.mode = InputMode::Nav;
            view_data.search_input.clear();
            let events = view_data.controller.clear_filter();
            after_view_events(view_data, internal_tx, &events);
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
            view_data
                .controller
                .set_search_term(view_data.search_input.clone(), now);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.push(ch);
            view_data
                .controller
                .set_search_term(view_data.search_input.clone(), now);
        }
        _ => {}
    }
}

fn handle_picker_key<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => view_data.mode = InputMode::Nav,
        KeyCode::Char('j') | KeyCode::Down => {
            let last = view_data.tables.len().saturating_sub(1);
            view_data.picker_cursor = (view_data.picker_cursor + 1).min(last);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.picker_cursor = view_data.picker_cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            view_data.mode = InputMode::Nav;
            let Some(table) = view_data
                .tables
                .get(view_data.picker_cursor)
                .map(|summary| summary.table_name.clone())
            else {
                return;
            };
            open_table(source, view_data, internal_tx, &table);
        }
        _ => {}
    }
}

fn open_table_picker<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match source.list_tables() {
        Ok(tables) => view_data.tables = tables,
        Err(error) => {
            emit_status(view_data, internal_tx, format!("load tables failed: {error:#}"));
            return;
        }
    }
    if view_data.tables.is_empty() {
        emit_status(view_data, internal_tx, "no tables");
        return;
    }
    let current = view_data.state().table.as_deref();
    view_data.picker_cursor = view_data
        .tables
        .iter()
        .position(|summary| Some(summary.table_name.as_str()) == current)
        .unwrap_or(0);
    view_data.mode = InputMode::TablePicker;
}

fn reload<S: DataSource>(
    source: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(table) = view_data.state().table.clone() else {
        emit_status(view_data, internal_tx, "no table loaded");
        return;
    };
    view_data
        .controller
        .set_contacts(load_contacts_or_empty(source));
    open_table(source, view_data, internal_tx, &table);
}

fn after_view_events(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[ViewEvent],
) {
    view_data.clamp_selection();
    if let Some(message) = events.iter().rev().find_map(event_status) {
        emit_status(view_data, internal_tx, message);
    }
}

fn event_status(event: &ViewEvent) -> Option<String> {
    match event {
        ViewEvent::ViewModeChanged(mode) => Some(format!("view: {}", mode.as_str())),
        ViewEvent::ViewModeUnavailable => {
            Some("conversations view needs a session_id column".to_owned())
        }
        ViewEvent::PlatformChanged(platform) => Some(format!("platform: {}", platform.label())),
        ViewEvent::SearchColumnChanged(column) => Some(format!("search in: {}", column.label())),
        ViewEvent::FilterCleared => Some("filter cleared".to_owned()),
        ViewEvent::SearchTermChanged(_) => None,
    }
}

fn platform_for_digit(digit: char) -> Option<PlatformFilter> {
    let index = digit.to_digit(10)? as usize;
    PlatformFilter::ALL.get(index).copied()
}

fn move_row(view_data: &mut ViewData, delta: isize) {
    let row_count = view_data.row_count();
    if row_count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let current = view_data.selected_row;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.selected_row = next.min(row_count - 1);
}

/// Column order: the descriptors when known, else the first row's keys.
fn table_columns(state: &ViewState, rows: &[Row]) -> Vec<String> {
    if !state.columns.is_empty() {
        return state
            .columns
            .iter()
            .map(|column| column.name.clone())
            .collect();
    }
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

fn row_cells(row: &Row, columns: &[String], contacts: &ContactMap) -> Vec<String> {
    columns
        .iter()
        .map(|column| cell_text(column, row.get(column).unwrap_or(&Value::Null), contacts))
        .collect()
}

fn title_text(view_data: &ViewData) -> String {
    let state = view_data.state();
    let table = state.table.as_deref().unwrap_or("no table");
    let mut title = format!("rowdesk | {table}");
    if state.has_session_column() {
        title.push_str(&format!(" | view: {}", state.view_mode.as_str()));
    }
    title
}

fn search_bar_text(view_data: &ViewData) -> String {
    let state = view_data.state();
    let input = match view_data.mode {
        InputMode::Search => format!("{}_", view_data.search_input),
        _ => view_data.controller.search_input().to_owned(),
    };
    let mut text = format!("search [{}]: {input}", state.search_column.label());
    if let Some(projection) = view_data.projection() {
        let count = projection.result_count_text();
        if !count.is_empty() {
            text.push_str(&format!("  ({count})"));
        }
    }
    text
}

fn status_text(view_data: &ViewData) -> String {
    let mode = match view_data.mode {
        InputMode::Nav => "NAV",
        InputMode::Search => "SEARCH",
        InputMode::TablePicker => "TABLES",
    };
    let counts = view_data
        .projection()
        .map(Projection::row_count_text)
        .unwrap_or_default();
    match &view_data.status {
        Some(status) => format!("{mode} | {counts} | {status}"),
        None => format!("{mode} | {counts} | {HELP_TEXT}"),
    }
}

fn table_picker_text(view_data: &ViewData) -> String {
    view_data
        .tables
        .iter()
        .enumerate()
        .map(|(index, summary)| {
            let marker = if index == view_data.picker_cursor { ">" } else { " " };
            match summary.row_count {
                Some(count) => format!("{marker} {} ({count})", summary.table_name),
                None => format!("{marker} {}", summary.table_name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let state = view_data.state();
    let selected_platform = PlatformFilter::ALL
        .iter()
        .position(|platform| *platform == state.active_platform)
        .unwrap_or(0);
    let chips = PlatformFilter::ALL
        .iter()
        .enumerate()
        .map(|(index, platform)| format!("{index} {}", platform.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(chips)
        .block(
            Block::default()
                .title(title_text(view_data))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected_platform);
    frame.render_widget(tabs, layout[0]);

    let search_style = if view_data.mode == InputMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_bar_text(view_data))
        .style(search_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, layout[1]);

    render_table(frame, layout[2], view_data);

    let status = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if view_data.mode == InputMode::TablePicker {
        let area = centered_rect(50, 60, frame.area());
        frame.render_widget(Clear, area);
        let picker = Paragraph::new(table_picker_text(view_data))
            .block(Block::default().title("tables").borders(Borders::ALL));
        frame.render_widget(picker, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let Some(projection) = view_data.projection() else {
        let empty = Paragraph::new(String::new()).block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let state = view_data.state();
    let columns = table_columns(state, &projection.display_rows);
    let widths = vec![Constraint::Min(8); columns.len().max(1)];

    let header = TableRow::new(columns.iter().map(|column| {
        Cell::from(column.clone()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = projection
        .display_rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let style = if index == view_data.selected_row {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            TableRow::new(row_cells(row, &columns, &state.contacts)).style(style)
        });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(projection.row_count_text())
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        InputMode, InternalEvent, ViewData, bootstrap, handle_key_event, platform_for_digit,
        process_internal_events, row_cells, search_bar_text, status_text, table_columns,
        table_picker_text,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rowdesk_app::{ContactMap, PlatformFilter, SearchColumn, ViewMode};
    use rowdesk_testkit::{
        CHAT_HISTORY_TABLE, DemoSource, HistorySeed, ORDERS_TABLE, chat_history_columns, rows,
    };
    use serde_json::json;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn small_source() -> DemoSource {
        let mut source = DemoSource::new("contacts");
        source.insert_table(
            CHAT_HISTORY_TABLE,
            chat_history_columns(),
            rows([
                json!({"id": 1, "session_id": "+529982404479", "message": {"type": "human", "data": {"content": "hola"}}, "created_at": null}),
                json!({"id": 2, "session_id": "+529982404479", "message": {"type": "ai", "data": {"content": "precio"}}, "created_at": null}),
                json!({"id": 3, "session_id": "messenger_55", "message": {"type": "human", "data": {"content": "info"}}, "created_at": null}),
            ]),
        );
        source.insert_table(
            "contacts",
            Vec::new(),
            rows([json!({"session_id": "messenger_55", "display_name": "Ana Cruz"})]),
        );
        source
    }

    fn booted(source: &mut DemoSource, table: Option<&str>) -> (ViewData, mpsc::Sender<InternalEvent>) {
        let mut view_data = ViewData::new(Duration::from_millis(200));
        let (tx, _rx) = mpsc::channel();
        bootstrap(source, &mut view_data, &tx, table);
        (view_data, tx)
    }

    #[test]
    fn bootstrap_loads_first_table_and_contacts() {
        let mut source = small_source();
        let (view_data, _tx) = booted(&mut source, None);
        assert_eq!(view_data.state().table.as_deref(), Some("contacts"));
        assert_eq!(view_data.state().contacts.len(), 1);
        assert!(view_data.projection().is_some());
    }

    #[test]
    fn typed_search_applies_after_debounce() {
        let mut source = small_source();
        let (mut view_data, tx) = booted(&mut source, Some(CHAT_HISTORY_TABLE));
        assert_eq!(view_data.row_count(), 2);

        let start = Instant::now();
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('/')), start);
        assert_eq!(view_data.mode, InputMode::Search);
        for (offset, ch) in "ana".chars().enumerate() {
            let at = start + Duration::from_millis(offset as u64 * 30);
            handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char(ch)), at);
        }
        assert_eq!(view_data.row_count(), 2);
        assert_eq!(view_data.controller.search_input(), "ana");

        let last = start + Duration::from_millis(60);
        assert!(!view_data.controller.flush_search(last + Duration::from_millis(150)));
        assert!(view_data.controller.flush_search(last + Duration::from_millis(200)));
        assert_eq!(view_data.row_count(), 1);
        assert!(search_bar_text(&view_data).ends_with("(1 of 2)"));

        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Enter), last);
        assert_eq!(view_data.mode, InputMode::Nav);
        assert!(status_text(&view_data).contains("1 contacts (filtered)"));
    }

    #[test]
    fn escape_in_search_clears_filter() {
        let mut source = small_source();
        let (mut view_data, tx) = booted(&mut source, Some(CHAT_HISTORY_TABLE));
        let now = Instant::now();
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('2')), now);
        assert_eq!(view_data.state().active_platform, PlatformFilter::Messenger);
        assert_eq!(view_data.row_count(), 1);

        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('/')), now);
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('x')), now);
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Esc), now);

        assert_eq!(view_data.mode, InputMode::Nav);
        assert_eq!(view_data.state().active_platform, PlatformFilter::All);
        assert_eq!(view_data.controller.search_input(), "");
        assert_eq!(view_data.row_count(), 2);
        assert_eq!(view_data.status.as_deref(), Some("filter cleared"));
    }

    #[test]
    fn view_toggle_and_unavailable_mode_report_status() {
        let mut source = DemoSource::seeded(&HistorySeed::default());
        let (mut view_data, tx) = booted(&mut source, Some(CHAT_HISTORY_TABLE));
        let now = Instant::now();
        let deduped = view_data.row_count();

        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('v')), now);
        assert_eq!(view_data.state().view_mode, ViewMode::All);
        assert!(view_data.row_count() > deduped);
        assert_eq!(view_data.status.as_deref(), Some("view: all"));

        let (mut orders, tx) = booted(&mut source, Some(ORDERS_TABLE));
        assert_eq!(orders.state().view_mode, ViewMode::All);
        let published = orders.controller.sink().published();
        handle_key_event(&mut source, &mut orders, &tx, key(KeyCode::Char('v')), now);
        assert_eq!(orders.state().view_mode, ViewMode::All);
        assert_eq!(orders.controller.sink().published(), published);
        assert_eq!(
            orders.status.as_deref(),
            Some("conversations view needs a session_id column")
        );
    }

    #[test]
    fn column_key_cycles_search_column() {
        let mut source = small_source();
        let (mut view_data, tx) = booted(&mut source, Some(CHAT_HISTORY_TABLE));
        assert_eq!(
            view_data.state().search_column,
            SearchColumn::Column("session_id".to_owned())
        );
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('c')), Instant::now());
        assert_eq!(
            view_data.state().search_column,
            SearchColumn::Column("message".to_owned())
        );
        assert_eq!(view_data.status.as_deref(), Some("search in: message"));
    }

    #[test]
    fn table_picker_switches_tables() {
        let mut source = small_source();
        let (mut view_data, tx) = booted(&mut source, Some(CHAT_HISTORY_TABLE));
        let now = Instant::now();

        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('t')), now);
        assert_eq!(view_data.mode, InputMode::TablePicker);
        assert_eq!(table_picker_text(&view_data), "  contacts (1)\n> n8n_chat_histories (3)");

        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('k')), now);
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Enter), now);
        assert_eq!(view_data.mode, InputMode::Nav);
        assert_eq!(view_data.state().table.as_deref(), Some("contacts"));
        assert_eq!(view_data.state().contacts.len(), 1);
    }

    #[test]
    fn row_motion_stays_in_bounds() {
        let mut source = small_source();
        let (mut view_data, tx) = booted(&mut source, Some(CHAT_HISTORY_TABLE));
        let now = Instant::now();
        for _ in 0..5 {
            handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('j')), now);
        }
        assert_eq!(view_data.selected_row, 1);
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('g')), now);
        assert_eq!(view_data.selected_row, 0);
        handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('k')), now);
        assert_eq!(view_data.selected_row, 0);
    }

    #[test]
    fn quit_keys() {
        let mut source = small_source();
        let (mut view_data, tx) = booted(&mut source, None);
        let now = Instant::now();
        assert!(handle_key_event(&mut source, &mut view_data, &tx, key(KeyCode::Char('q')), now));
        assert!(handle_key_event(
            &mut source,
            &mut view_data,
            &tx,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            now
        ));
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut view_data = ViewData::new(Duration::from_millis(200));
        let (tx, rx) = mpsc::channel();
        view_data.status = Some("loaded".to_owned());
        view_data.status_token = 2;

        tx.send(InternalEvent::ClearStatus { token: 1 }).expect("send");
        process_internal_events(&mut view_data, &rx);
        assert_eq!(view_data.status.as_deref(), Some("loaded"));

        tx.send(InternalEvent::ClearStatus { token: 2 }).expect("send");
        process_internal_events(&mut view_data, &rx);
        assert_eq!(view_data.status, None);
    }

    #[test]
    fn cells_use_friendly_formatting() {
        let contacts: ContactMap = [("messenger_55", "Ana Cruz")].into_iter().collect();
        let row = rows([json!({
            "session_id": "messenger_55",
            "message": {"type": "human", "data": {"content": "hola"}},
        })])
        .remove(0);
        let columns = vec![
            "session_id".to_owned(),
            "message".to_owned(),
            "missing".to_owned(),
        ];
        assert_eq!(
            row_cells(&row, &columns, &contacts),
            vec!["Ana Cruz #55", "customer: hola", "null"]
        );
    }

    #[test]
    fn columns_fall_back_to_row_keys() {
        let view_data = ViewData::new(Duration::from_millis(200));
        let data = rows([json!({"b": 1, "a": 2})]);
        assert_eq!(table_columns(view_data.state(), &data), vec!["b", "a"]);
    }

    #[test]
    fn digits_map_to_platform_chips() {
        assert_eq!(platform_for_digit('0'), Some(PlatformFilter::All));
        assert_eq!(platform_for_digit('3'), Some(PlatformFilter::Instagram));
        assert_eq!(platform_for_digit('4'), None);
    }
}
