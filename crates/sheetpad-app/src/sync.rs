// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub id: Option<String>,
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("sheet {0:?} not found")]
    NotFound(String),
    #[error("sheet {0:?} already exists")]
    Conflict(String),
    #[error("rejected: {0}")]
    Validation(String),
    #[error("server error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("decode response: {0}")]
    Decode(String),
}

/// The remote sheets collection.
///
/// `replace_rows` overwrites every stored row of the sheet; callers always
/// send the whole grid.
pub trait SheetSync {
    fn list_sheets(&mut self) -> Result<Vec<SheetSummary>, SyncError>;
    fn create_sheet(&mut self, name: &str) -> Result<Sheet, SyncError>;
    fn fetch_sheet(&mut self, key: &str) -> Result<Sheet, SyncError>;
    fn replace_rows(&mut self, key: &str, rows: &[Vec<String>]) -> Result<(), SyncError>;
    fn delete_sheet(&mut self, name: &str) -> Result<(), SyncError>;
}
