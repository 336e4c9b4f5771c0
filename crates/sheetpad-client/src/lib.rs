// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking HTTP client for the sheets REST service.
//!
//! ```text
//! GET    {base}          -> [{ "name": ... }]
//! POST   {base}          <- { "name": ... }
//! GET    {base}/{key}    -> { "_id"?: ..., "name": ..., "rows": [[...]] }
//! PUT    {base}/{key}    <- { "rows": [[...]] }   (replaces every row)
//! DELETE {base}/{key}
//! ```

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetpad_app::{Sheet, SheetSummary, SheetSync, SyncError};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/sheets";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("invalid server.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            bail!("server.base_url {trimmed:?} must be an http:// or https:// URL");
        }

        let http = HttpClient::builder()
            .user_agent(format!("sheetpad/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cheapest round trip the service supports: a listing.
    pub fn ping(&self) -> Result<(), SyncError> {
        self.list_sheets().map(|_| ())
    }

    pub fn list_sheets(&self) -> Result<Vec<SheetSummary>, SyncError> {
        let url = self.base_url.clone();
        let response = self.send(self.http.get(url.clone()), "GET", &url, "")?;
        let rows: Vec<SummaryRow> = response
            .json()
            .map_err(|error| SyncError::Decode(format!("sheet list: {error}")))?;
        Ok(rows
            .into_iter()
            .map(|row| SheetSummary { name: row.name })
            .collect())
    }

    pub fn create_sheet(&self, name: &str) -> Result<Sheet, SyncError> {
        let url = self.base_url.clone();
        let request = self.http.post(url.clone()).json(&CreateRequest { name });
        let response = self.send(request, "POST", &url, name)?;
        let body = response.text().unwrap_or_default();
        Ok(serde_json::from_str::<SheetBody>(&body)
            .map(|parsed| parsed.into_sheet(name))
            .unwrap_or_else(|_| Sheet::empty(name)))
    }

    pub fn fetch_sheet(&self, key: &str) -> Result<Sheet, SyncError> {
        let url = self.sheet_url(key)?;
        let response = self.send(self.http.get(url.clone()), "GET", &url, key)?;
        let body: SheetBody = response
            .json()
            .map_err(|error| SyncError::Decode(format!("sheet {key:?}: {error}")))?;
        Ok(body.into_sheet(key))
    }

    pub fn replace_rows(&self, key: &str, rows: &[Vec<String>]) -> Result<(), SyncError> {
        let url = self.sheet_url(key)?;
        let request = self.http.put(url.clone()).json(&ReplaceRowsRequest { rows });
        self.send(request, "PUT", &url, key)?;
        Ok(())
    }

    pub fn delete_sheet(&self, name: &str) -> Result<(), SyncError> {
        let url = self.sheet_url(name)?;
        self.send(self.http.delete(url.clone()), "DELETE", &url, name)?;
        Ok(())
    }

    fn sheet_url(&self, key: &str) -> Result<Url, SyncError> {
        if key.is_empty() {
            return Err(SyncError::Validation("sheet name must not be empty".to_owned()));
        }
        // `push` drops dot segments, which would leave the collection URL.
        if matches!(key, "." | "..") {
            return Err(SyncError::Validation(format!(
                "sheet name {key:?} cannot be used as a path segment"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SyncError::Validation(format!("{} cannot carry a sheet path", self.base_url))
            })?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }

    fn send(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &Url,
        key: &str,
    ) -> Result<Response, SyncError> {
        debug!("{method} {url}");
        let response = request.send().map_err(|error| {
            warn!("{method} {url}: {error}");
            connection_error(self.base_url.as_str(), &error)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        warn!("{method} {url}: {status}");
        Err(status_error(status, &body, key))
    }
}

impl SheetSync for Client {
    fn list_sheets(&mut self) -> Result<Vec<SheetSummary>, SyncError> {
        Client::list_sheets(self)
    }

    fn create_sheet(&mut self, name: &str) -> Result<Sheet, SyncError> {
        Client::create_sheet(self, name)
    }

    fn fetch_sheet(&mut self, key: &str) -> Result<Sheet, SyncError> {
        Client::fetch_sheet(self, key)
    }

    fn replace_rows(&mut self, key: &str, rows: &[Vec<String>]) -> Result<(), SyncError> {
        Client::replace_rows(self, key, rows)
    }

    fn delete_sheet(&mut self, name: &str) -> Result<(), SyncError> {
        Client::delete_sheet(self, name)
    }
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> SyncError {
    let reason = if error.is_timeout() {
        "timed out".to_owned()
    } else {
        error.to_string()
    };
    SyncError::Network(format!(
        "cannot reach {base_url} -- check that the sheets service is running ({reason})"
    ))
}

fn status_error(status: StatusCode, body: &str, key: &str) -> SyncError {
    match status {
        StatusCode::NOT_FOUND => SyncError::NotFound(key.to_owned()),
        StatusCode::CONFLICT => SyncError::Conflict(key.to_owned()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            SyncError::Validation(error_message(status, body))
        }
        _ => SyncError::Http {
            status: status.as_u16(),
            message: error_message(status, body),
        },
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.is_empty()
    {
        return message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return trimmed.to_owned();
    }

    format!("server returned {}", status.as_u16())
}

/// Cells are strings on the wire, but the service may hand back `null` or a
/// bare number for a cell it never saw written.
fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ReplaceRowsRequest<'a> {
    rows: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct SummaryRow {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SheetBody {
    #[serde(rename = "_id")]
    id: Option<Value>,
    name: Option<String>,
    rows: Option<Vec<Vec<Value>>>,
}

impl SheetBody {
    fn into_sheet(self, fallback_name: &str) -> Sheet {
        let id = self.id.and_then(|id| match id {
            Value::Null => None,
            Value::String(text) => Some(text),
            Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_owned),
            other => Some(other.to_string()),
        });
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| fallback_name.to_owned());
        let rows = self
            .rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Sheet { id, name, rows }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Client, SheetBody, cell_text, error_message, status_error};
    use anyhow::Result;
    use reqwest::StatusCode;
    use serde_json::json;
    use sheetpad_app::SyncError;
    use std::time::Duration;

    #[test]
    fn new_trims_trailing_slashes() -> Result<()> {
        let client = Client::new("http://localhost:5000/api/sheets///", Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://localhost:5000/api/sheets");
        Ok(())
    }

    #[test]
    fn new_rejects_empty_and_non_http_urls() {
        let empty = Client::new("  ", Duration::from_secs(1)).expect_err("empty should fail");
        assert!(empty.to_string().contains("must not be empty"));

        let ftp = Client::new("ftp://example.com/sheets", Duration::from_secs(1))
            .expect_err("ftp should fail");
        assert!(ftp.to_string().contains("http://"));

        let junk = Client::new("not a url", Duration::from_secs(1)).expect_err("junk should fail");
        assert!(junk.to_string().contains("invalid server.base_url"));
    }

    #[test]
    fn sheet_url_encodes_name_as_one_segment() -> Result<()> {
        let client = Client::new("http://localhost:5000/api/sheets", Duration::from_secs(1))?;
        let url = client.sheet_url("Q1 plan/draft")?;
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/sheets/Q1%20plan%2Fdraft"
        );
        assert!(matches!(
            client.sheet_url(""),
            Err(SyncError::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn sheet_url_rejects_dot_segments() -> Result<()> {
        let client = Client::new("http://localhost:5000/api/sheets", Duration::from_secs(1))?;
        for key in [".", ".."] {
            assert!(
                matches!(client.sheet_url(key), Err(SyncError::Validation(_))),
                "{key:?}"
            );
        }
        assert_eq!(
            client.sheet_url("a")?.as_str(),
            "http://localhost:5000/api/sheets/a"
        );
        assert_eq!(
            client.sheet_url("...")?.as_str(),
            "http://localhost:5000/api/sheets/..."
        );
        Ok(())
    }

    #[test]
    fn sheet_body_normalizes_cells_and_ids() -> Result<()> {
        let body: SheetBody = serde_json::from_value(json!({
            "_id": { "$oid": "65f0c0ffee" },
            "name": "budget",
            "rows": [["a", null], [3, true]],
        }))?;
        let sheet = body.into_sheet("ignored");
        assert_eq!(sheet.id.as_deref(), Some("65f0c0ffee"));
        assert_eq!(sheet.name, "budget");
        assert_eq!(sheet.rows, vec![vec!["a", ""], vec!["3", "true"]]);
        Ok(())
    }

    #[test]
    fn sheet_body_without_rows_is_empty() -> Result<()> {
        let body: SheetBody = serde_json::from_value(json!({ "rows": null }))?;
        let sheet = body.into_sheet("fallback");
        assert_eq!(sheet.name, "fallback");
        assert!(sheet.rows.is_empty());
        assert!(sheet.id.is_none());
        Ok(())
    }

    #[test]
    fn cell_text_keeps_strings_verbatim() {
        assert_eq!(cell_text(json!("  spaced ")), "  spaced ");
        assert_eq!(cell_text(json!(1.5)), "1.5");
    }

    #[test]
    fn status_errors_map_to_taxonomy() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, "", "ghost"),
            SyncError::NotFound("ghost".to_owned())
        );
        assert_eq!(
            status_error(StatusCode::CONFLICT, "", "dup"),
            SyncError::Conflict("dup".to_owned())
        );
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, r#"{"error":"name required"}"#, ""),
            SyncError::Validation("name required".to_owned())
        );
        assert_eq!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom", "x"),
            SyncError::Http {
                status: 500,
                message: "boom".to_owned(),
            }
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>{}</html>"),
            "server returned 502"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, r#"{"message":"upstream down"}"#),
            "upstream down"
        );
    }
}
