// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use sheetpad_app::{Sheet, SheetSummary, SheetSync, SyncError};
use std::collections::{BTreeMap, VecDeque};

const SAMPLE_HEADER: [&str; 4] = ["Region", "Rep", "Status", "Amount"];
const SAMPLE_ROWS: [[&str; 4]; 5] = [
    ["North", "Avery", "open", "120"],
    ["South", "Jordan", "done", "85"],
    ["North", "Avery", "open", "120"],
    ["  East coast ", "riley", "open", "240"],
    ["West", "Quinn", "blocked", ""],
];

/// One call made against [`MemorySync`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCall {
    List,
    Create(String),
    Fetch(String),
    ReplaceRows(String, Vec<Vec<String>>),
    Delete(String),
}

/// In-memory stand-in for the sheets service.
///
/// Sheets are kept in name order. `fail_next` queues errors that are
/// returned, one per call, before any real work is done.
#[derive(Debug, Clone, Default)]
pub struct MemorySync {
    sheets: BTreeMap<String, Vec<Vec<String>>>,
    calls: Vec<SyncCall>,
    failures: VecDeque<SyncError>,
    offline: bool,
}

impl MemorySync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<String>>) -> Self {
        self.sheets.insert(name.to_owned(), rows);
        self
    }

    pub fn with_empty_sheet(self, name: &str) -> Self {
        self.with_sheet(name, Vec::new())
    }

    pub fn with_sample_sheet(self, name: &str) -> Self {
        self.with_sheet(name, sample_rows())
    }

    /// Every call fails with a network error while offline.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn fail_next(&mut self, error: SyncError) {
        self.failures.push_back(error);
    }

    pub fn calls(&self) -> &[SyncCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn writes(&self) -> Vec<&[Vec<String>]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SyncCall::ReplaceRows(_, rows) => Some(rows.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn rows(&self, name: &str) -> Option<&[Vec<String>]> {
        self.sheets.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    fn record(&mut self, call: SyncCall) -> Result<(), SyncError> {
        self.calls.push(call);
        if self.offline {
            return Err(SyncError::Network(
                "cannot reach memory:// -- service offline".to_owned(),
            ));
        }
        match self.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl SheetSync for MemorySync {
    fn list_sheets(&mut self) -> Result<Vec<SheetSummary>, SyncError> {
        self.record(SyncCall::List)?;
        Ok(self
            .sheets
            .keys()
            .map(|name| SheetSummary { name: name.clone() })
            .collect())
    }

    fn create_sheet(&mut self, name: &str) -> Result<Sheet, SyncError> {
        self.record(SyncCall::Create(name.to_owned()))?;
        if self.sheets.contains_key(name) {
            return Err(SyncError::Conflict(name.to_owned()));
        }
        self.sheets.insert(name.to_owned(), Vec::new());
        Ok(Sheet::empty(name))
    }

    fn fetch_sheet(&mut self, key: &str) -> Result<Sheet, SyncError> {
        self.record(SyncCall::Fetch(key.to_owned()))?;
        let rows = self
            .sheets
            .get(key)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(key.to_owned()))?;
        Ok(Sheet {
            id: Some(format!("mem-{key}")),
            name: key.to_owned(),
            rows,
        })
    }

    fn replace_rows(&mut self, key: &str, rows: &[Vec<String>]) -> Result<(), SyncError> {
        self.record(SyncCall::ReplaceRows(key.to_owned(), rows.to_vec()))?;
        let stored = self
            .sheets
            .get_mut(key)
            .ok_or_else(|| SyncError::NotFound(key.to_owned()))?;
        *stored = rows.to_vec();
        Ok(())
    }

    fn delete_sheet(&mut self, name: &str) -> Result<(), SyncError> {
        self.record(SyncCall::Delete(name.to_owned()))?;
        self.sheets
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SyncError::NotFound(name.to_owned()))
    }
}

/// Header plus five rows; rows 0 and 2 of the body are duplicates and one
/// cell carries stray whitespace.
pub fn sample_rows() -> Vec<Vec<String>> {
    std::iter::once(SAMPLE_HEADER)
        .chain(SAMPLE_ROWS)
        .map(|row| row.iter().map(|cell| (*cell).to_owned()).collect())
        .collect()
}

pub fn rows_of(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| (*cell).to_owned()).collect())
        .collect()
}
