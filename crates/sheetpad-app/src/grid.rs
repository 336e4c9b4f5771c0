// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Rectangular grid of string cells.
//!
//! Every operation borrows the grid and returns a new one, so a caller that
//! still holds the previous grid (the renderer, a pending write) never sees
//! it change underneath it.

use crate::transform::Transform;
use thiserror::Error;

pub const DEFAULT_ROWS: usize = 5;
pub const DEFAULT_COLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Spreadsheet-style reference such as `A1` or `AB12`.
    pub fn reference(self) -> String {
        format!("{}{}", column_label(self.col), self.row + 1)
    }
}

/// Column letters for a zero-based index: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_label(col: usize) -> String {
    let mut label = String::new();
    let mut n = col;
    loop {
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {reference} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        reference: String,
        rows: usize,
        cols: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::create_default(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Grid {
    /// Empty-string grid; zero dimensions are raised to one.
    pub fn create_default(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows: vec![vec![String::new(); cols]; rows],
        }
    }

    /// Builds a grid from stored rows, padding short rows with empty cells.
    /// Returns `None` when there is nothing to show (no rows or no columns).
    pub fn from_rows(rows: Vec<Vec<String>>) -> Option<Self> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return None;
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Some(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row < self.row_count() && pos.col < self.col_count()
    }

    pub fn cell(&self, pos: CellPos) -> Option<&str> {
        self.rows
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .map(String::as_str)
    }

    pub fn set_cell(&self, pos: CellPos, value: impl Into<String>) -> Result<Self, GridError> {
        self.check_bounds(pos)?;
        let mut next = self.clone();
        next.rows[pos.row][pos.col] = value.into();
        Ok(next)
    }

    pub fn add_row(&self) -> Self {
        let mut next = self.clone();
        next.rows.push(vec![String::new(); self.col_count()]);
        next
    }

    /// Drops the last row. A single-row grid is returned unchanged.
    pub fn delete_row(&self) -> Self {
        let mut next = self.clone();
        if next.rows.len() > 1 {
            next.rows.pop();
        }
        next
    }

    pub fn add_column(&self) -> Self {
        let mut next = self.clone();
        for row in &mut next.rows {
            row.push(String::new());
        }
        next
    }

    /// Drops the last column. A single-column grid is returned unchanged.
    pub fn delete_column(&self) -> Self {
        let mut next = self.clone();
        if self.col_count() > 1 {
            for row in &mut next.rows {
                row.pop();
            }
        }
        next
    }

    /// Keeps the first occurrence of every distinct row, in order.
    pub fn remove_duplicate_rows(&self) -> Self {
        let mut kept: Vec<Vec<String>> = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if !kept.contains(row) {
                kept.push(row.clone());
            }
        }
        Self { rows: kept }
    }

    /// Literal replacement of every occurrence of `search` in every cell.
    /// An empty `search` leaves the grid as it is.
    pub fn find_and_replace(&self, search: &str, replace: &str) -> Self {
        if search.is_empty() {
            return self.clone();
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.contains(search) {
                            cell.replace(search, replace)
                        } else {
                            cell.clone()
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn apply_transform(&self, pos: CellPos, kind: Transform) -> Result<Self, GridError> {
        self.check_bounds(pos)?;
        let value = kind.apply(&self.rows[pos.row][pos.col]);
        self.set_cell(pos, value)
    }

    fn check_bounds(&self, pos: CellPos) -> Result<(), GridError> {
        if self.contains(pos) {
            return Ok(());
        }
        Err(GridError::OutOfBounds {
            reference: pos.reference(),
            rows: self.row_count(),
            cols: self.col_count(),
        })
    }
}
