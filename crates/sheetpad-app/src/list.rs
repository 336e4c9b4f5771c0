// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::sync::{SheetSummary, SheetSync};
use log::warn;

pub const EMPTY_LIST_MESSAGE: &str = "No sheets available. Create one!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    Refreshed(usize),
    Created(String),
    Deleted(String),
    Failed(String),
    Rejected(String),
}

/// Landing-page controller: the named sheets on the service.
#[derive(Debug, Clone, Default)]
pub struct SheetList {
    sheets: Vec<SheetSummary>,
    cursor: usize,
    status_line: Option<String>,
}

impl SheetList {
    pub fn sheets(&self) -> &[SheetSummary] {
        &self.sheets
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&SheetSummary> {
        self.sheets.get(self.cursor)
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status_line = None;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let last = self.sheets.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// A failed listing leaves the list empty.
    pub fn refresh(&mut self, sync: &mut dyn SheetSync) -> ListEvent {
        match sync.list_sheets() {
            Ok(sheets) => {
                self.sheets = sheets;
                self.move_cursor(0);
                ListEvent::Refreshed(self.sheets.len())
            }
            Err(error) => {
                warn!("list sheets: {error}");
                self.sheets.clear();
                self.cursor = 0;
                self.fail(format!("could not list sheets: {error}"))
            }
        }
    }

    pub fn create(&mut self, sync: &mut dyn SheetSync, name: &str) -> ListEvent {
        let name = name.trim();
        if name.is_empty() {
            return self.reject("sheet name must not be empty");
        }
        // A dot segment would address the whole collection.
        if matches!(name, "." | "..") {
            return self.reject("sheet name must not be \".\" or \"..\"");
        }

        if let Err(error) = sync.create_sheet(name) {
            warn!("create sheet {name:?}: {error}");
            return self.fail(format!("could not create {name:?}: {error}"));
        }

        let refreshed = self.refresh(sync);
        if let Some(index) = self.sheets.iter().position(|sheet| sheet.name == name) {
            self.cursor = index;
        }
        self.status_line = Some(after_refresh(format!("created {name}"), refreshed));
        ListEvent::Created(name.to_owned())
    }

    pub fn delete_selected(&mut self, sync: &mut dyn SheetSync) -> ListEvent {
        let Some(name) = self.selected().map(|sheet| sheet.name.clone()) else {
            return self.reject("no sheet selected");
        };
        self.delete(sync, &name)
    }

    pub fn delete(&mut self, sync: &mut dyn SheetSync, name: &str) -> ListEvent {
        if let Err(error) = sync.delete_sheet(name) {
            warn!("delete sheet {name:?}: {error}");
            return self.fail(format!("could not delete {name:?}: {error}"));
        }

        let refreshed = self.refresh(sync);
        self.status_line = Some(after_refresh(format!("deleted {name}"), refreshed));
        ListEvent::Deleted(name.to_owned())
    }

    fn fail(&mut self, message: String) -> ListEvent {
        self.status_line = Some(message.clone());
        ListEvent::Failed(message)
    }

    fn reject(&mut self, message: &str) -> ListEvent {
        self.status_line = Some(message.to_owned());
        ListEvent::Rejected(message.to_owned())
    }
}

/// Keeps a failed follow-up listing visible next to the success message.
fn after_refresh(done: String, refreshed: ListEvent) -> String {
    match refreshed {
        ListEvent::Failed(message) => format!("{done}; {message}"),
        _ => done,
    }
}
