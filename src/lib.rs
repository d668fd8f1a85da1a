//! # ngeso
//!
//! A Rust client for the National Grid ESO open data portal.
//!
//! The portal exposes its datasets through a SQL endpoint. This crate builds
//! the SQL for a date-bounded, optionally filtered selection from one resource,
//! runs it, and hands back the raw response body. Whole files can also be
//! downloaded as-is.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ngeso::{NgEso, QueryParams};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NgEso::new("7c0411cd-2714-4bb5-a408-adb065edf34d")?;
//!
//!     let params = QueryParams::new()
//!         .date_col("TARGETDATE")
//!         .date_range("2018-01-02", "2018-01-02");
//!
//!     let body = client.query_with(&params)?;
//!     let json: serde_json::Value = serde_json::from_slice(&body)?;
//!     println!("{}", json["result"]["records"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Optional settings are read from a platform-specific config file, e.g.
//! `~/.config/ngeso/settings.conf` on Linux:
//!
//! ```ini
//! [default]
//! base_url = https://data.nationalgrideso.com/api/3/action
//! timeout = 60
//! ```
//!
//! `NGESO_BASE_URL` overrides `base_url`.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod query;
pub mod response;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use client::NgEso;
pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, MemorySink, Severity};
pub use query::{build_query, build_query_preview};
pub use response::record_count;
pub use types::{AccessMode, DatasetRef, DateInput, DateRange, NgEsoError, QueryParams, Result};
