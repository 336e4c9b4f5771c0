// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use log::info;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table};
use sheetpad_app::{
    CellColor, CellPos, CellStyle, DEFAULT_COLS, DEFAULT_FONT_SIZE, DEFAULT_ROWS,
    EMPTY_LIST_MESSAGE, NOT_FOUND_MESSAGE, SheetList, SheetSync, SheetView, StyleChange, Transform,
    ViewCommand, ViewStatus, column_label,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const CELL_WIDTH: u16 = 14;
const ROW_LABEL_WIDTH: u16 = 5;
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Open this sheet instead of the sheet list.
    pub open_sheet: Option<String>,
    pub default_rows: usize,
    pub default_cols: usize,
    /// Shown in the title bar so the user knows which service they edit.
    pub service_label: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            open_sheet: None,
            default_rows: DEFAULT_ROWS,
            default_cols: DEFAULT_COLS,
            service_label: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone)]
enum Screen {
    Home,
    Sheet(Box<SheetView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    NewSheet,
    ConfirmDelete(String),
    EditCell(CellPos),
    Find,
    Replace { search: String },
}

impl PromptKind {
    fn title(&self) -> String {
        match self {
            Self::NewSheet => "new sheet name".to_owned(),
            Self::ConfirmDelete(name) => format!("delete {name:?}? (y/n)"),
            Self::EditCell(pos) => format!("edit {}", pos.reference()),
            Self::Find => "find".to_owned(),
            Self::Replace { search } => format!("replace {search:?} with"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    input: String,
}

#[derive(Debug, Clone)]
struct UiState {
    screen: Screen,
    list: SheetList,
    prompt: Option<Prompt>,
    help_visible: bool,
    status_token: u64,
    options: LaunchOptions,
}

impl UiState {
    fn new(options: LaunchOptions) -> Self {
        Self {
            screen: Screen::Home,
            list: SheetList::default(),
            prompt: None,
            help_visible: false,
            status_token: 0,
            options,
        }
    }

    fn status_line(&self) -> Option<&str> {
        match &self.screen {
            Screen::Home => self.list.status_line(),
            Screen::Sheet(view) => view.status_line(),
        }
    }
}

pub fn run_app<S: SheetSync>(sync: &mut S, options: LaunchOptions) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut ui = UiState::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();
    start(&mut ui, sync, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut ui, sync, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, &ui)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if handle_key_event(&mut ui, sync, &internal_tx, key) {
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

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start(ui: &mut UiState, sync: &mut dyn SheetSync, tx: &Sender<InternalEvent>) {
    match ui.options.open_sheet.clone() {
        Some(name) => open_sheet(ui, sync, tx, &name),
        None => {
            ui.list.refresh(sync);
            note_status(ui, tx);
        }
    }
}

fn process_internal_events(
    ui: &mut UiState,
    sync: &mut dyn SheetSync,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == ui.status_token => {
                ui.list.clear_status();
                if let Screen::Sheet(view) = &mut ui.screen {
                    view.dispatch(sync, ViewCommand::ClearStatus);
                }
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

/// Arms the delayed clear for whatever status line is now showing.
fn note_status(ui: &mut UiState, internal_tx: &Sender<InternalEvent>) {
    if ui.status_line().is_none() {
        return;
    }
    ui.status_token = ui.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, ui.status_token);
}

fn open_sheet(ui: &mut UiState, sync: &mut dyn SheetSync, tx: &Sender<InternalEvent>, name: &str) {
    info!("opening sheet {name:?}");
    let mut view = SheetView::with_default_size(
        name,
        ui.options.default_rows,
        ui.options.default_cols,
    );
    view.load(sync);
    if view.status() == &ViewStatus::Populated {
        view.dispatch(sync, ViewCommand::Select(CellPos::new(0, 0)));
    }
    ui.screen = Screen::Sheet(Box::new(view));
    note_status(ui, tx);
}

fn go_home(ui: &mut UiState, sync: &mut dyn SheetSync, tx: &Sender<InternalEvent>) {
    ui.screen = Screen::Home;
    ui.list.refresh(sync);
    note_status(ui, tx);
}

fn handle_key_event(
    ui: &mut UiState,
    sync: &mut dyn SheetSync,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if ui.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            ui.help_visible = false;
        }
        return false;
    }

    if ui.prompt.is_some() {
        handle_prompt_key(ui, sync, internal_tx, key);
        return false;
    }

    if key.code == KeyCode::Char('?') {
        ui.help_visible = true;
        return false;
    }

    match ui.screen {
        Screen::Home => handle_home_key(ui, sync, internal_tx, key),
        Screen::Sheet(_) => {
            handle_sheet_key(ui, sync, internal_tx, key);
            false
        }
    }
}

fn handle_home_key(
    ui: &mut UiState,
    sync: &mut dyn SheetSync,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => ui.list.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => ui.list.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => ui.list.move_cursor(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => ui.list.move_cursor(isize::MAX),
        KeyCode::Char('r') => {
            ui.list.refresh(sync);
            note_status(ui, internal_tx);
        }
        KeyCode::Char('n') => open_prompt(ui, PromptKind::NewSheet, String::new()),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(name) = ui.list.selected().map(|sheet| sheet.name.clone()) {
                open_prompt(ui, PromptKind::ConfirmDelete(name), String::new());
            }
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            if let Some(name) = ui.list.selected().map(|sheet| sheet.name.clone()) {
                open_sheet(ui, sync, internal_tx, &name);
            }
        }
        _ => {}
    }
    false
}

fn handle_sheet_key(
    ui: &mut UiState,
    sync: &mut dyn SheetSync,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Screen::Sheet(view) = &mut ui.screen else {
        return;
    };

    let command = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            go_home(ui, sync, internal_tx);
            return;
        }
        KeyCode::Char('r') => {
            view.refresh(sync);
            note_status(ui, internal_tx);
            return;
        }
        KeyCode::Enter | KeyCode::Char('e') | KeyCode::F(2) => {
            let Some(pos) = view.selection() else {
                return;
            };
            let current = view.formula_bar().to_owned();
            open_prompt(ui, PromptKind::EditCell(pos), current);
            return;
        }
        KeyCode::Char('f') => {
            open_prompt(ui, PromptKind::Find, String::new());
            return;
        }
        KeyCode::Char('h') | KeyCode::Left => ViewCommand::MoveSelection { rows: 0, cols: -1 },
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
            ViewCommand::MoveSelection { rows: 0, cols: 1 }
        }
        KeyCode::Char('k') | KeyCode::Up => ViewCommand::MoveSelection { rows: -1, cols: 0 },
        KeyCode::Char('j') | KeyCode::Down => ViewCommand::MoveSelection { rows: 1, cols: 0 },
        KeyCode::Backspace | KeyCode::Delete => match view.selection() {
            Some(pos) => ViewCommand::SetCell {
                pos,
                value: String::new(),
            },
            None => return,
        },
        KeyCode::Char('a') => ViewCommand::AddRow,
        KeyCode::Char('x') => ViewCommand::DeleteRow,
        KeyCode::Char('A') => ViewCommand::AddColumn,
        KeyCode::Char('X') => ViewCommand::DeleteColumn,
        KeyCode::Char('T') => ViewCommand::Transform(Transform::Trim),
        KeyCode::Char('U') => ViewCommand::Transform(Transform::Upper),
        KeyCode::Char('L') => ViewCommand::Transform(Transform::Lower),
        KeyCode::Char('D') => ViewCommand::RemoveDuplicates,
        KeyCode::Char('b') => ViewCommand::Style(StyleChange::Bold),
        KeyCode::Char('i') => ViewCommand::Style(StyleChange::Italic),
        KeyCode::Char('s') => ViewCommand::Style(StyleChange::NextSize),
        KeyCode::Char('c') => ViewCommand::Style(StyleChange::NextColor),
        KeyCode::Char('C') => ViewCommand::Style(StyleChange::Clear),
        _ => return,
    };

    view.dispatch(sync, command);
    note_status(ui, internal_tx);
}

fn open_prompt(ui: &mut UiState, kind: PromptKind, input: String) {
    ui.prompt = Some(Prompt { kind, input });
}

fn handle_prompt_key(
    ui: &mut UiState,
    sync: &mut dyn SheetSync,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(prompt) = ui.prompt.as_mut() else {
        return;
    };

    if let PromptKind::ConfirmDelete(name) = &prompt.kind {
        let name = name.clone();
        ui.prompt = None;
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            ui.list.delete(sync, &name);
            note_status(ui, internal_tx);
        }
        return;
    }

    match key.code {
        KeyCode::Esc => ui.prompt = None,
        KeyCode::Backspace => {
            prompt.input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.input.push(ch);
        }
        KeyCode::Enter => {
            if let Some(prompt) = ui.prompt.take() {
                submit_prompt(ui, sync, internal_tx, prompt);
            }
        }
        _ => {}
    }
}

fn submit_prompt(
    ui: &mut UiState,
    sync: &mut dyn SheetSync,
    internal_tx: &Sender<InternalEvent>,
    prompt: Prompt,
) {
    let Prompt { kind, input } = prompt;
    if kind == PromptKind::NewSheet {
        ui.list.create(sync, &input);
        note_status(ui, internal_tx);
        return;
    }

    let Screen::Sheet(view) = &mut ui.screen else {
        return;
    };
    let command = match kind {
        PromptKind::EditCell(pos) => {
            if view.selection() != Some(pos) {
                view.dispatch(sync, ViewCommand::Select(pos));
            }
            ViewCommand::EditFormulaBar(input)
        }
        // An empty search falls through so the view reports the rejection.
        PromptKind::Find if !input.is_empty() => {
            ui.prompt = Some(Prompt {
                kind: PromptKind::Replace { search: input },
                input: String::new(),
            });
            return;
        }
        PromptKind::Find => ViewCommand::FindReplace {
            search: String::new(),
            replace: String::new(),
        },
        PromptKind::Replace { search } => ViewCommand::FindReplace {
            search,
            replace: input,
        },
        PromptKind::NewSheet | PromptKind::ConfirmDelete(_) => return,
    };
    view.dispatch(sync, command);
    note_status(ui, internal_tx);
}

fn render(frame: &mut ratatui::Frame<'_>, ui: &UiState) {
    let sheet_screen = matches!(ui.screen, Screen::Sheet(_));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if sheet_screen { 3 } else { 0 }),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = Paragraph::new(title_text(ui))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().title("sheetpad").borders(Borders::ALL));
    frame.render_widget(title, layout[0]);

    match &ui.screen {
        Screen::Home => render_home(frame, layout[2], &ui.list),
        Screen::Sheet(view) => {
            let formula = Paragraph::new(formula_bar_text(view))
                .block(Block::default().title("fx").borders(Borders::ALL));
            frame.render_widget(formula, layout[1]);
            render_sheet(frame, layout[2], view);
        }
    }

    let status = Paragraph::new(status_text(ui))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let Some(prompt) = &ui.prompt {
        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);
        let input = Paragraph::new(format!("{}_", prompt.input)).block(
            Block::default()
                .title(prompt.kind.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(input, area);
    }

    if ui.help_visible {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_home(frame: &mut ratatui::Frame<'_>, area: Rect, list: &SheetList) {
    let block = Block::default().title("sheets").borders(Borders::ALL);
    if list.sheets().is_empty() {
        frame.render_widget(Paragraph::new(EMPTY_LIST_MESSAGE).block(block), area);
        return;
    }

    let items = list
        .sheets()
        .iter()
        .map(|sheet| ListItem::new(sheet.name.clone()))
        .collect::<Vec<_>>();
    let widget = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(list.cursor()));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn render_sheet(frame: &mut ratatui::Frame<'_>, area: Rect, view: &SheetView) {
    let block = Block::default().title(view.name().to_owned()).borders(Borders::ALL);
    let grid = match (view.status(), view.grid()) {
        (ViewStatus::Populated, Some(grid)) => grid,
        (status, _) => {
            let message = view_status_message(status);
            frame.render_widget(Paragraph::new(message).block(block), area);
            return;
        }
    };

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain((0..grid.col_count()).map(|col| Cell::from(column_label(col))))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = grid.rows().iter().enumerate().map(|(row_index, row)| {
        let label = Cell::from(format!("{}", row_index + 1))
            .style(Style::default().fg(Color::DarkGray));
        let cells = row.iter().enumerate().map(|(col_index, value)| {
            let pos = CellPos::new(row_index, col_index);
            let mut style = cell_style(view.styles().get(pos));
            if view.selection() == Some(pos) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Cell::from(value.clone()).style(style)
        });
        Row::new(std::iter::once(label).chain(cells).collect::<Vec<_>>())
    });

    let widths = std::iter::once(Constraint::Length(ROW_LABEL_WIDTH))
        .chain((0..grid.col_count()).map(|_| Constraint::Length(CELL_WIDTH)))
        .collect::<Vec<_>>();
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn view_status_message(status: &ViewStatus) -> String {
    match status {
        ViewStatus::Loading => "Loading...".to_owned(),
        ViewStatus::Populated => String::new(),
        ViewStatus::NotFound => NOT_FOUND_MESSAGE.to_owned(),
        ViewStatus::Failed(message) => message.clone(),
    }
}

fn title_text(ui: &UiState) -> String {
    let location = match &ui.screen {
        Screen::Home => "sheets".to_owned(),
        Screen::Sheet(view) => format!("sheet / {}", view.name()),
    };
    if ui.options.service_label.is_empty() {
        location
    } else {
        format!("{location}  @ {}", ui.options.service_label)
    }
}

fn formula_bar_text(view: &SheetView) -> String {
    match view.selection() {
        Some(pos) => {
            let style = style_summary(view.styles().get(pos));
            if style.is_empty() {
                format!("{}  {}", pos.reference(), view.formula_bar())
            } else {
                format!("{}  {}  [{style}]", pos.reference(), view.formula_bar())
            }
        }
        None => "select a cell".to_owned(),
    }
}

fn style_summary(style: CellStyle) -> String {
    let mut parts = Vec::new();
    if style.bold {
        parts.push("bold".to_owned());
    }
    if style.italic {
        parts.push("italic".to_owned());
    }
    if let Some(size) = style.size {
        parts.push(format!("{size}px"));
    }
    if let Some(color) = style.color {
        parts.push(color.as_str().to_owned());
    }
    parts.join(" ")
}

fn cell_style(style: CellStyle) -> Style {
    let mut out = Style::default();
    if style.bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.italic {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_size() > DEFAULT_FONT_SIZE {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    if let Some(color) = style.color {
        out = out.fg(terminal_color(color));
    }
    out
}

fn terminal_color(color: CellColor) -> Color {
    match color {
        CellColor::Red => Color::Red,
        CellColor::Green => Color::Green,
        CellColor::Yellow => Color::Yellow,
        CellColor::Blue => Color::Blue,
        CellColor::Magenta => Color::Magenta,
        CellColor::Cyan => Color::Cyan,
    }
}

fn status_text(ui: &UiState) -> String {
    if let Some(line) = ui.status_line() {
        return line.to_owned();
    }
    match ui.screen {
        Screen::Home => "enter open  n new  d delete  r refresh  ? help  q quit".to_owned(),
        Screen::Sheet(_) => "enter edit  a/x row  A/X col  f find  ? help  esc back".to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "sheets\n  j/k move   enter open   n new   d delete   r refresh   q quit\n\n\
     sheet\n  h/j/k/l move   enter edit cell   del clear cell   r reload   esc back\n  \
     a add row   x delete row   A add column   X delete column\n  \
     T trim   U upper   L lower   D remove duplicate rows   f find & replace\n  \
     b bold   i italic   s size   c color   C clear style\n\n\
     styles stay on this screen and are not saved\n\n\
     ctrl+q quit   ? close help"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        InternalEvent, LaunchOptions, Screen, UiState, cell_style, formula_bar_text,
        handle_key_event, help_overlay_text, process_internal_events, start, status_text,
        style_summary, title_text,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::{Color, Modifier};
    use sheetpad_app::{CellColor, CellPos, CellStyle, SyncError, ViewStatus};
    use sheetpad_testkit::{MemorySync, SyncCall, rows_of};
    use std::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    fn type_text(ui: &mut UiState, sync: &mut MemorySync, text: &str) {
        let (tx, _rx) = mpsc::channel();
        for c in text.chars() {
            handle_key_event(ui, sync, &tx, ch(c));
        }
    }

    fn press(ui: &mut UiState, sync: &mut MemorySync, event: KeyEvent) -> bool {
        let (tx, _rx) = mpsc::channel();
        handle_key_event(ui, sync, &tx, event)
    }

    fn started(sync: &mut MemorySync, open_sheet: Option<&str>) -> UiState {
        let mut ui = UiState::new(LaunchOptions {
            open_sheet: open_sheet.map(str::to_owned),
            ..LaunchOptions::default()
        });
        let (tx, _rx) = mpsc::channel();
        start(&mut ui, sync, &tx);
        ui
    }

    fn open_view(ui: &UiState) -> &sheetpad_app::SheetView {
        match &ui.screen {
            Screen::Sheet(view) => view,
            Screen::Home => panic!("expected sheet screen"),
        }
    }

    #[test]
    fn start_lists_sheets() {
        let mut sync = MemorySync::new()
            .with_empty_sheet("beta")
            .with_empty_sheet("alpha");
        let ui = started(&mut sync, None);

        let names = ui
            .list
            .sheets()
            .iter()
            .map(|sheet| sheet.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(sync.calls(), &[SyncCall::List]);
    }

    #[test]
    fn opening_empty_sheet_bootstraps_once() {
        let mut sync = MemorySync::new().with_empty_sheet("fresh");
        let mut ui = started(&mut sync, None);
        sync.clear_calls();

        press(&mut ui, &mut sync, key(KeyCode::Enter));

        let view = open_view(&ui);
        assert_eq!(view.status(), &ViewStatus::Populated);
        assert_eq!(view.selection(), Some(CellPos::new(0, 0)));
        assert_eq!(sync.writes().len(), 1);
        assert_eq!(sync.rows("fresh").map(<[_]>::len), Some(5));
    }

    #[test]
    fn editing_a_cell_saves_the_grid() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        press(&mut ui, &mut sync, ch('j'));
        press(&mut ui, &mut sync, key(KeyCode::Enter));
        for _ in 0.."North".len() {
            press(&mut ui, &mut sync, key(KeyCode::Backspace));
        }
        type_text(&mut ui, &mut sync, "Central");
        press(&mut ui, &mut sync, key(KeyCode::Enter));

        assert!(ui.prompt.is_none());
        assert_eq!(sync.writes().len(), 1);
        let stored = sync.rows("chores").expect("sheet");
        assert_eq!(stored[1][0], "Central");
        assert_eq!(open_view(&ui).formula_bar(), "Central");
    }

    #[test]
    fn escape_cancels_edit_without_saving() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        press(&mut ui, &mut sync, key(KeyCode::Enter));
        type_text(&mut ui, &mut sync, "zzz");
        press(&mut ui, &mut sync, key(KeyCode::Esc));

        assert!(ui.prompt.is_none());
        assert!(sync.writes().is_empty());
        assert!(matches!(ui.screen, Screen::Sheet(_)));
    }

    #[test]
    fn find_and_replace_prompts_twice() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        press(&mut ui, &mut sync, ch('f'));
        type_text(&mut ui, &mut sync, "open");
        press(&mut ui, &mut sync, key(KeyCode::Enter));
        type_text(&mut ui, &mut sync, "todo");
        press(&mut ui, &mut sync, key(KeyCode::Enter));

        assert_eq!(sync.writes().len(), 1);
        let stored = sync.rows("chores").expect("sheet");
        assert!(stored.iter().flatten().all(|cell| cell != "open"));
        assert_eq!(
            stored.iter().flatten().filter(|cell| *cell == "todo").count(),
            3
        );
    }

    #[test]
    fn structural_keys_each_write_once() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        for c in ['a', 'A', 'x', 'X', 'D'] {
            press(&mut ui, &mut sync, ch(c));
        }

        assert_eq!(sync.writes().len(), 5);
        let stored = sync.rows("chores").expect("sheet");
        assert_eq!(stored.len(), 5, "one duplicate row removed");
        assert!(stored.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn style_keys_do_not_write() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        for c in ['b', 'i', 's', 'c'] {
            press(&mut ui, &mut sync, ch(c));
        }

        assert!(sync.calls().is_empty());
        let style = open_view(&ui).styles().get(CellPos::new(0, 0));
        assert!(style.bold && style.italic);
        assert_eq!(style.size, Some(16));
        assert_eq!(style.color, Some(CellColor::Red));
    }

    #[test]
    fn transform_keys_apply_to_selection() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));

        for _ in 0..4 {
            press(&mut ui, &mut sync, ch('j'));
        }
        press(&mut ui, &mut sync, ch('T'));
        press(&mut ui, &mut sync, ch('U'));

        let stored = sync.rows("chores").expect("sheet");
        assert_eq!(stored[4][0], "EAST COAST");
    }

    #[test]
    fn new_sheet_prompt_creates_and_lists() {
        let mut sync = MemorySync::new();
        let mut ui = started(&mut sync, None);

        press(&mut ui, &mut sync, ch('n'));
        type_text(&mut ui, &mut sync, "budget");
        press(&mut ui, &mut sync, key(KeyCode::Enter));

        assert_eq!(sync.names(), vec!["budget"]);
        assert_eq!(ui.list.sheets().len(), 1);
        assert_eq!(ui.list.status_line(), Some("created budget"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut sync = MemorySync::new()
            .with_empty_sheet("keep")
            .with_empty_sheet("old");
        let mut ui = started(&mut sync, None);
        press(&mut ui, &mut sync, ch('j'));

        press(&mut ui, &mut sync, ch('d'));
        press(&mut ui, &mut sync, ch('n'));
        assert_eq!(sync.names(), vec!["keep", "old"]);

        press(&mut ui, &mut sync, ch('d'));
        press(&mut ui, &mut sync, ch('y'));
        assert_eq!(sync.names(), vec!["keep"]);
        assert_eq!(ui.list.sheets().len(), 1);
    }

    #[test]
    fn escape_returns_home_and_refreshes() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        let quit = press(&mut ui, &mut sync, key(KeyCode::Esc));
        assert!(!quit);
        assert!(matches!(ui.screen, Screen::Home));
        assert_eq!(sync.calls(), &[SyncCall::List]);

        assert!(press(&mut ui, &mut sync, ch('q')));
    }

    #[test]
    fn missing_sheet_shows_message_and_ignores_edits() {
        let mut sync = MemorySync::new();
        let mut ui = started(&mut sync, Some("ghost"));

        assert_eq!(open_view(&ui).status(), &ViewStatus::NotFound);
        assert_eq!(status_text(&ui), "Sheet not found");

        press(&mut ui, &mut sync, ch('a'));
        assert!(sync.writes().is_empty());
        assert_eq!(status_text(&ui), "sheet is not loaded");
    }

    #[test]
    fn failed_save_is_reported_in_status() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.fail_next(SyncError::Network("timed out".to_owned()));

        press(&mut ui, &mut sync, ch('a'));

        assert!(status_text(&ui).contains("local edits kept"));
        assert_eq!(open_view(&ui).grid().map(|grid| grid.row_count()), Some(7));
        assert_eq!(sync.rows("chores").map(<[_]>::len), Some(6));
    }

    #[test]
    fn status_clears_only_for_latest_token() {
        let mut sync = MemorySync::new();
        sync.set_offline(true);
        let mut ui = started(&mut sync, None);
        assert!(ui.list.status_line().is_some());

        let (tx, rx) = mpsc::channel();
        tx.send(InternalEvent::ClearStatus {
            token: ui.status_token + 1,
        })
        .expect("send");
        process_internal_events(&mut ui, &mut sync, &rx);
        assert!(ui.list.status_line().is_some());

        tx.send(InternalEvent::ClearStatus {
            token: ui.status_token,
        })
        .expect("send");
        process_internal_events(&mut ui, &mut sync, &rx);
        assert!(ui.list.status_line().is_none());
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        sync.clear_calls();

        press(&mut ui, &mut sync, ch('?'));
        assert!(ui.help_visible);
        press(&mut ui, &mut sync, ch('a'));
        assert!(sync.calls().is_empty());
        press(&mut ui, &mut sync, key(KeyCode::Esc));
        assert!(!ui.help_visible);
        assert!(help_overlay_text().contains("not saved"));
    }

    #[test]
    fn ctrl_q_quits_from_anywhere() {
        let mut sync = MemorySync::new().with_sample_sheet("chores");
        let mut ui = started(&mut sync, Some("chores"));
        press(&mut ui, &mut sync, ch('f'));
        assert!(press(
            &mut ui,
            &mut sync,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)
        ));
    }

    #[test]
    fn formula_bar_shows_reference_value_and_style() {
        let mut sync = MemorySync::new().with_sheet("s", rows_of(&[&["hello"]]));
        let mut ui = started(&mut sync, Some("s"));
        assert_eq!(formula_bar_text(open_view(&ui)), "A1  hello");

        press(&mut ui, &mut sync, ch('b'));
        assert_eq!(formula_bar_text(open_view(&ui)), "A1  hello  [bold]");
    }

    #[test]
    fn style_helpers_map_to_terminal_styles() {
        let style = CellStyle {
            bold: true,
            italic: false,
            size: Some(18),
            color: Some(CellColor::Blue),
        };
        assert_eq!(style_summary(style), "bold 18px blue");
        let rendered = cell_style(style);
        assert!(rendered.add_modifier.contains(Modifier::BOLD));
        assert!(rendered.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(rendered.fg, Some(Color::Blue));
        assert_eq!(style_summary(CellStyle::default()), "");
    }

    #[test]
    fn title_includes_service_label() {
        let mut ui = UiState::new(LaunchOptions {
            service_label: "http://localhost:5000/api/sheets".to_owned(),
            ..LaunchOptions::default()
        });
        assert_eq!(title_text(&ui), "sheets  @ http://localhost:5000/api/sheets");
        ui.options.service_label.clear();
        assert_eq!(title_text(&ui), "sheets");
    }
}
