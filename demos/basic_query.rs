//! Basic query example for ngeso.
//!
//! Run with: cargo run --example basic_query -- <resource-id> <date-col> <start> <end>

use ngeso::{Diagnostic, DiagnosticSink, NgEso, QueryParams};
use std::env;
use std::sync::Arc;

/// No logger is installed here, so print diagnostics directly.
struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        eprintln!("warning: {}", diagnostic);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let resource = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("7c0411cd-2714-4bb5-a408-adb065edf34d");
    let date_col = args.get(2).map(|s| s.as_str()).unwrap_or("TARGETDATE");
    let start = args.get(3).map(|s| s.as_str()).unwrap_or("2018-01-02");
    let end = args.get(4).map(|s| s.as_str()).unwrap_or(start);

    println!("ngeso Basic Query Example");
    println!("=========================");
    println!("Resource: {}", resource);
    println!("Column:   {}", date_col);
    println!("Range:    {} .. {}", start, end);
    println!();

    let client = NgEso::new(resource)?.with_sink(Arc::new(StderrSink));
    let params = QueryParams::new().date_col(date_col).date_range(start, end);

    println!("Generated query preview:");
    println!("{}", ngeso::build_query_preview(resource, &params));
    println!();

    let body = client.query_with(&params)?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    let records = json["result"]["records"].as_array().cloned().unwrap_or_default();

    println!("Records returned: {}", records.len());
    for record in records.iter().take(5) {
        println!("  {}", record);
    }

    Ok(())
}

