//! Diagnostic events raised while talking to the portal.
//!
//! Events go to a [`DiagnosticSink`]. The default [`LogSink`] forwards them to
//! the `log` facade; callers that want to observe them directly can install
//! their own sink on the client.

use crate::types::DateRange;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Debug,
    Warning,
}

/// A structured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub dataset_id: String,
    pub range: DateRange,
    pub message: String,
}

impl Diagnostic {
    /// The query succeeded but returned zero records.
    pub fn no_data(dataset_id: &str, range: &DateRange) -> Self {
        Self {
            severity: Severity::Warning,
            dataset_id: dataset_id.to_string(),
            range: range.clone(),
            message: "No data found".to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for dataset {} (date range {})",
            self.message, self.dataset_id, self.range
        )
    }
}

/// Receiver for diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Debug => log::debug!("{}", diagnostic),
            Severity::Warning => log::warn!("{}", diagnostic),
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: &Diagnostic) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(diagnostic.clone());
    }
}
