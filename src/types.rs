//! Core types for ESO data portal queries and results.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types for ESO data portal operations.
#[derive(Error, Debug)]
pub enum NgEsoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The portal rejected the request, either with an error status or with
    /// `"success": false` in the response envelope.
    #[error("Unsuccessful request (status_code={status_code}): {detail}")]
    UnsuccessfulRequest { status_code: u16, detail: String },

    #[error("Metadata lookup failed: {0}")]
    Metadata(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ESO data portal operations.
pub type Result<T> = std::result::Result<T, NgEsoError>;

/// How a dataset resource is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// SQL through the datastore endpoint (default)
    #[default]
    Query,
    /// Whole-file download of the resource
    File,
}

impl std::str::FromStr for AccessMode {
    type Err = NgEsoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "query" | "sql" => Ok(AccessMode::Query),
            "file" | "download" => Ok(AccessMode::File),
            other => Err(NgEsoError::Config(format!("Unknown access mode '{}'", other))),
        }
    }
}

/// A resource in the portal together with the way it is accessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    resource_id: String,
    mode: AccessMode,
}

impl DatasetRef {
    pub fn new(resource_id: impl Into<String>, mode: AccessMode) -> Self {
        Self {
            resource_id: resource_id.into(),
            mode,
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }
}

/// A date bound as accepted from callers.
///
/// Every variant renders to a canonical SQL literal body: `YYYY-MM-DD` for
/// dates, `YYYY-MM-DD HH:MM:SS` for datetimes. Text that parses as either is
/// re-rendered canonically; anything else is passed through untouched and left
/// for the portal to reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl DateInput {
    /// Canonical literal used inside the SQL string.
    pub fn to_literal(&self) -> String {
        match self {
            DateInput::Date(d) => date_literal(d),
            DateInput::DateTime(dt) => datetime_literal(dt),
            DateInput::Text(s) => text_literal(s),
        }
    }
}

fn date_literal(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

fn datetime_literal(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn text_literal(s: &str) -> String {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return date_literal(&d);
    }
    for fmt in [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return datetime_literal(&dt);
        }
    }
    s.to_string()
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        DateInput::DateTime(dt)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

/// Optional lower and upper date bounds. The order of `start` and `end` is
/// not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateInput>,
    pub end: Option<DateInput>,
}

impl DateRange {
    pub fn new(start: Option<DateInput>, end: Option<DateInput>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.as_ref().map(DateInput::to_literal);
        let end = self.end.as_ref().map(DateInput::to_literal);
        write!(
            f,
            "{}..{}",
            start.as_deref().unwrap_or(""),
            end.as_deref().unwrap_or("")
        )
    }
}

/// Parameters for a datastore query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Column the date bounds apply to
    pub date_col: Option<String>,

    /// Date bounds on `date_col`
    pub range: DateRange,

    /// Pre-formatted SQL boolean fragments, AND-ed in order
    pub filters: Vec<String>,
}

impl QueryParams {
    /// Create new empty query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date column.
    pub fn date_col(mut self, col: impl Into<String>) -> Self {
        self.date_col = Some(col.into());
        self
    }

    /// Set the lower date bound (inclusive).
    pub fn start(mut self, start: impl Into<DateInput>) -> Self {
        self.range.start = Some(start.into());
        self
    }

    /// Set the upper date bound (inclusive).
    pub fn end(mut self, end: impl Into<DateInput>) -> Self {
        self.range.end = Some(end.into());
        self
    }

    /// Set both date bounds.
    pub fn date_range(self, start: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.start(start).end(end)
    }

    /// Append a filter fragment such as `"Service" = 'DCH'`.
    pub fn filter(mut self, fragment: impl Into<String>) -> Self {
        self.filters.push(fragment.into());
        self
    }

    /// Check if any predicate source is set.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty() && self.filters.is_empty()
    }
}
