// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Sends log records to `path`; the terminal belongs to the TUI.
/// `RUST_LOG` directives replace `level` when set.
pub fn init(level: LevelFilter, path: &Path) -> Result<()> {
    let mut builder = builder(level, path)?;
    builder
        .try_init()
        .context("install logger; another logger is already active")
}

fn builder(level: LevelFilter, path: &Path) -> Result<Builder> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [logging].file to a writable path",
                path.display()
            )
        })?;

    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .format_timestamp_millis()
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));
    if let Ok(filters) = env::var("RUST_LOG")
        && !filters.trim().is_empty()
    {
        builder.parse_filters(&filters);
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::builder;
    use anyhow::Result;
    use log::{Level, LevelFilter, Log, Record};

    #[test]
    fn builder_creates_parent_directories_and_writes_records() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("sheetpad.log");

        let logger = builder(LevelFilter::Info, &path)?.build();
        logger.log(
            &Record::builder()
                .args(format_args!("saved sheet \"budget\""))
                .level(Level::Warn)
                .target("sheetpad")
                .build(),
        );
        logger.flush();

        let written = std::fs::read_to_string(&path)?;
        assert!(written.contains("saved sheet \"budget\""));
        assert!(written.contains("WARN"));
        Ok(())
    }

    #[test]
    fn unwritable_path_reports_config_hint() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let error = builder(LevelFilter::Info, temp.path())
            .err()
            .map(|error| error.to_string())
            .unwrap_or_default();
        assert!(error.contains("[logging].file"), "got {error:?}");
        Ok(())
    }
}
