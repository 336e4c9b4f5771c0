// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Controller for a single open sheet.
//!
//! Every command that changes the grid is followed by exactly one
//! `replace_rows` carrying the whole post-edit grid. Writes run on the
//! caller's thread, so they reach the service in the order the edits were
//! made. A failed write is logged and reported; the local grid is kept.

use crate::grid::{CellPos, DEFAULT_COLS, DEFAULT_ROWS, Grid};
use crate::style::{CellStyle, StyleChange, StyleMap};
use crate::sync::{SheetSync, SyncError};
use crate::transform::Transform;
use log::{debug, info, warn};

pub const NOT_FOUND_MESSAGE: &str = "Sheet not found";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load sheet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Populated,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Select(CellPos),
    MoveSelection { rows: isize, cols: isize },
    ClearSelection,
    SetCell { pos: CellPos, value: String },
    EditFormulaBar(String),
    AddRow,
    DeleteRow,
    AddColumn,
    DeleteColumn,
    Transform(Transform),
    RemoveDuplicates,
    FindReplace { search: String, replace: String },
    Style(StyleChange),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Loaded { rows: usize, cols: usize },
    Bootstrapped { rows: usize, cols: usize },
    NotFound,
    LoadFailed(String),
    GridChanged,
    Persisted,
    PersistFailed(String),
    SelectionChanged(Option<CellPos>),
    StyleChanged(CellPos, CellStyle),
    Rejected(String),
    StatusUpdated(String),
    StatusCleared,
}

#[derive(Debug, Clone)]
pub struct SheetView {
    name: String,
    id: Option<String>,
    status: ViewStatus,
    grid: Option<Grid>,
    styles: StyleMap,
    selection: Option<CellPos>,
    formula_bar: String,
    status_line: Option<String>,
    default_rows: usize,
    default_cols: usize,
}

impl SheetView {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_default_size(name, DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// `rows`/`cols` size the grid created for a sheet with no stored rows.
    pub fn with_default_size(name: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            name: name.into(),
            id: None,
            status: ViewStatus::Loading,
            grid: None,
            styles: StyleMap::default(),
            selection: None,
            formula_bar: String::new(),
            status_line: None,
            default_rows: rows.max(1),
            default_cols: cols.max(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn selection(&self) -> Option<CellPos> {
        self.selection
    }

    pub fn formula_bar(&self) -> &str {
        &self.formula_bar
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn load(&mut self, sync: &mut dyn SheetSync) -> Vec<ViewEvent> {
        self.status = ViewStatus::Loading;
        let sheet = match sync.fetch_sheet(&self.name) {
            Ok(sheet) => sheet,
            Err(SyncError::NotFound(_)) => {
                warn!("sheet {:?} not found", self.name);
                self.status = ViewStatus::NotFound;
                return vec![ViewEvent::NotFound, self.set_status(NOT_FOUND_MESSAGE)];
            }
            Err(error) => {
                warn!("load sheet {:?}: {error}", self.name);
                self.status = ViewStatus::Failed(LOAD_FAILED_MESSAGE.to_owned());
                return vec![
                    ViewEvent::LoadFailed(error.to_string()),
                    self.set_status(format!("{LOAD_FAILED_MESSAGE}: {error}")),
                ];
            }
        };

        if sheet.id.is_some() {
            self.id = sheet.id;
        }
        self.status = ViewStatus::Populated;

        match Grid::from_rows(sheet.rows) {
            Some(grid) => {
                let event = ViewEvent::Loaded {
                    rows: grid.row_count(),
                    cols: grid.col_count(),
                };
                self.install(grid);
                vec![event]
            }
            None => {
                let grid = Grid::create_default(self.default_rows, self.default_cols);
                info!(
                    "sheet {:?} has no rows; bootstrapping a {}x{} grid",
                    self.name,
                    grid.row_count(),
                    grid.col_count()
                );
                let mut events = vec![ViewEvent::Bootstrapped {
                    rows: grid.row_count(),
                    cols: grid.col_count(),
                }];
                self.install(grid);
                events.extend(self.persist(sync));
                events
            }
        }
    }

    /// Reloads from the service; styles and a still-valid selection survive.
    pub fn refresh(&mut self, sync: &mut dyn SheetSync) -> Vec<ViewEvent> {
        self.load(sync)
    }

    pub fn dispatch(&mut self, sync: &mut dyn SheetSync, command: ViewCommand) -> Vec<ViewEvent> {
        if command == ViewCommand::ClearStatus {
            self.status_line = None;
            return vec![ViewEvent::StatusCleared];
        }
        if command == ViewCommand::ClearSelection {
            self.selection = None;
            self.formula_bar.clear();
            return vec![ViewEvent::SelectionChanged(None)];
        }

        let Some(grid) = self.grid.clone() else {
            return vec![self.reject("sheet is not loaded")];
        };
        if self.status != ViewStatus::Populated {
            return vec![self.reject("sheet is not loaded")];
        }

        match command {
            ViewCommand::Select(pos) => {
                if !grid.contains(pos) {
                    return vec![self.reject(format!("{} is outside the sheet", pos.reference()))];
                }
                self.select(pos)
            }
            ViewCommand::MoveSelection { rows, cols } => {
                let current = self.selection.unwrap_or(CellPos::new(0, 0));
                let pos = CellPos::new(
                    offset_clamped(current.row, rows, grid.row_count()),
                    offset_clamped(current.col, cols, grid.col_count()),
                );
                if self.selection == Some(pos) {
                    return Vec::new();
                }
                self.select(pos)
            }
            ViewCommand::SetCell { pos, value } => match grid.set_cell(pos, value) {
                Ok(next) => self.commit(sync, next),
                Err(error) => vec![self.reject(error.to_string())],
            },
            ViewCommand::EditFormulaBar(text) => {
                let Some(pos) = self.selection else {
                    return vec![self.reject("select a cell first")];
                };
                self.formula_bar = text.clone();
                match grid.set_cell(pos, text) {
                    Ok(next) => self.commit(sync, next),
                    Err(error) => vec![self.reject(error.to_string())],
                }
            }
            ViewCommand::AddRow => self.commit(sync, grid.add_row()),
            ViewCommand::DeleteRow => {
                if grid.row_count() == 1 {
                    return vec![self.set_status("a sheet keeps at least one row")];
                }
                self.commit(sync, grid.delete_row())
            }
            ViewCommand::AddColumn => self.commit(sync, grid.add_column()),
            ViewCommand::DeleteColumn => {
                if grid.col_count() == 1 {
                    return vec![self.set_status("a sheet keeps at least one column")];
                }
                self.commit(sync, grid.delete_column())
            }
            ViewCommand::Transform(kind) => {
                let Some(pos) = self.selection else {
                    return vec![self.reject("select a cell first")];
                };
                match grid.apply_transform(pos, kind) {
                    Ok(next) => self.commit(sync, next),
                    Err(error) => vec![self.reject(error.to_string())],
                }
            }
            ViewCommand::RemoveDuplicates => {
                let next = grid.remove_duplicate_rows();
                let removed = grid.row_count() - next.row_count();
                if removed == 0 {
                    return vec![self.set_status("no duplicate rows")];
                }
                let mut events = self.commit(sync, next);
                events.push(self.set_status(format!("removed {removed} duplicate row(s)")));
                events
            }
            ViewCommand::FindReplace { search, replace } => {
                if search.is_empty() {
                    return vec![self.reject("find text must not be empty")];
                }
                let next = grid.find_and_replace(&search, &replace);
                if next == grid {
                    return vec![self.set_status(format!("{search:?} not found"))];
                }
                self.commit(sync, next)
            }
            ViewCommand::Style(change) => {
                let Some(pos) = self.selection else {
                    return vec![self.reject("select a cell first")];
                };
                let style = self.styles.apply(pos, change);
                vec![ViewEvent::StyleChanged(pos, style)]
            }
            ViewCommand::ClearStatus | ViewCommand::ClearSelection => Vec::new(),
        }
    }

    fn install(&mut self, grid: Grid) {
        self.styles.retain_within(grid.row_count(), grid.col_count());
        self.selection = self.selection.map(|pos| clamp_to(pos, &grid));
        self.formula_bar = self
            .selection
            .and_then(|pos| grid.cell(pos))
            .unwrap_or_default()
            .to_owned();
        self.grid = Some(grid);
    }

    fn select(&mut self, pos: CellPos) -> Vec<ViewEvent> {
        self.selection = Some(pos);
        self.formula_bar = self
            .grid
            .as_ref()
            .and_then(|grid| grid.cell(pos))
            .unwrap_or_default()
            .to_owned();
        vec![ViewEvent::SelectionChanged(Some(pos))]
    }

    fn commit(&mut self, sync: &mut dyn SheetSync, next: Grid) -> Vec<ViewEvent> {
        if self.grid.as_ref() == Some(&next) {
            return Vec::new();
        }
        let previous_selection = self.selection;
        self.install(next);

        let mut events = vec![ViewEvent::GridChanged];
        if self.selection != previous_selection {
            events.push(ViewEvent::SelectionChanged(self.selection));
        }
        events.extend(self.persist(sync));
        events
    }

    fn persist(&mut self, sync: &mut dyn SheetSync) -> Vec<ViewEvent> {
        let Some(grid) = &self.grid else {
            return Vec::new();
        };
        match sync.replace_rows(&self.name, grid.rows()) {
            Ok(()) => {
                debug!(
                    "saved sheet {:?} ({}x{})",
                    self.name,
                    grid.row_count(),
                    grid.col_count()
                );
                vec![ViewEvent::Persisted]
            }
            Err(error) => {
                warn!("save sheet {:?}: {error}", self.name);
                vec![
                    ViewEvent::PersistFailed(error.to_string()),
                    self.set_status(format!("save failed: {error}; local edits kept")),
                ]
            }
        }
    }

    fn reject(&mut self, message: impl Into<String>) -> ViewEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        ViewEvent::Rejected(message)
    }

    fn set_status(&mut self, message: impl Into<String>) -> ViewEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        ViewEvent::StatusUpdated(message)
    }
}

fn offset_clamped(index: usize, delta: isize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    index.saturating_add_signed(delta).min(last)
}

fn clamp_to(pos: CellPos, grid: &Grid) -> CellPos {
    CellPos::new(
        pos.row.min(grid.row_count().saturating_sub(1)),
        pos.col.min(grid.col_count().saturating_sub(1)),
    )
}
