// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use log::LevelFilter;
use serde::Deserialize;
use sheetpad_app::{DEFAULT_COLS, DEFAULT_ROWS};
use sheetpad_client::DEFAULT_BASE_URL;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "sheetpad";
pub const CONFIG_PATH_ENV: &str = "SHEETPAD_CONFIG_PATH";
pub const BASE_URL_ENV: &str = "SHEETPAD_BASE_URL";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_ROWS: usize = 1000;
// Column ZZ.
const MAX_COLS: usize = 702;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub grid: GridDefaults,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            grid: GridDefaults::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridDefaults {
    pub default_rows: Option<usize>,
    pub default_cols: Option<usize>,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self {
            default_rows: Some(DEFAULT_ROWS),
            default_cols: Some(DEFAULT_COLS),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [server], [grid], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.server.base_url
            && base_url.trim().is_empty()
        {
            bail!("server.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.server.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "server.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(rows) = self.grid.default_rows
            && !(1..=MAX_ROWS).contains(&rows)
        {
            bail!(
                "grid.default_rows in {} must be between 1 and {MAX_ROWS}, got {rows}",
                path.display()
            );
        }

        if let Some(cols) = self.grid.default_cols
            && !(1..=MAX_COLS).contains(&cols)
        {
            bail!(
                "grid.default_cols in {} must be between 1 and {MAX_COLS}, got {cols}",
                path.display()
            );
        }

        if let Some(level) = &self.logging.level {
            parse_level(level)
                .with_context(|| format!("logging.level in {}", path.display()))?;
        }

        Ok(())
    }

    /// `SHEETPAD_BASE_URL` wins over the file so one config can point at
    /// several services.
    pub fn base_url(&self) -> String {
        if let Ok(value) = env::var(BASE_URL_ENV)
            && !value.trim().is_empty()
        {
            return value.trim().to_owned();
        }
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .to_owned()
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn default_rows(&self) -> usize {
        self.grid.default_rows.unwrap_or(DEFAULT_ROWS)
    }

    pub fn default_cols(&self) -> usize {
        self.grid.default_cols.unwrap_or(DEFAULT_COLS)
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        parse_level(self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.logging.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set logging.file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("sheetpad.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# sheetpad config\n# Place this file at: {}\n\nversion = 1\n\n[server]\n# {BASE_URL_ENV} overrides this value\nbase_url = \"{DEFAULT_BASE_URL}\"\n# <N>ms, <N>s or <N>m\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[grid]\n# Size of the grid created for a sheet that has no rows yet\ndefault_rows = {DEFAULT_ROWS}\ndefault_cols = {DEFAULT_COLS}\n\n[logging]\n# error, warn, info, debug, trace or off; RUST_LOG overrides\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/sheetpad/sheetpad.log)\n# file = \"/absolute/path/to/sheetpad.log\"\n",
            path.display(),
        )
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        _ => bail!("invalid log level {raw:?}; use one of: error, warn, info, debug, trace, off"),
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
