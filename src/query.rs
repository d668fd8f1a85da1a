//! SQL query builder for the ESO datastore.
//!
//! The datastore speaks PostgreSQL: resource ids and column names are quoted
//! identifiers, date bounds are string literals the server casts on comparison.

use crate::types::QueryParams;

/// Accumulates predicates, emitting `WHERE` for the first and `AND` for the rest.
struct WhereClause {
    sql: String,
    has_predicate: bool,
}

impl WhereClause {
    fn new(base: String) -> Self {
        Self {
            sql: base,
            has_predicate: false,
        }
    }

    fn push(&mut self, predicate: &str) {
        let keyword = if self.has_predicate { "AND" } else { "WHERE" };
        self.sql.push_str(&format!(" {keyword} {predicate}"));
        self.has_predicate = true;
    }

    fn finish(self) -> String {
        self.sql
    }
}

/// Build the SELECT statement for a datastore resource.
///
/// Predicates are appended in a fixed order: lower date bound, upper date
/// bound, then each filter fragment as given. A bound without a date column
/// compares against the empty identifier `""`, which the portal rejects.
pub fn build_query(resource_id: &str, params: &QueryParams) -> String {
    let mut clause = WhereClause::new(format!("SELECT * FROM {}", quote_ident(resource_id)));

    let col = quote_ident(params.date_col.as_deref().unwrap_or(""));
    if let Some(start) = &params.range.start {
        clause.push(&format!("{col} >= '{}'", escape_sql(&start.to_literal())));
    }
    if let Some(end) = &params.range.end {
        clause.push(&format!("{col} <= '{}'", escape_sql(&end.to_literal())));
    }

    for fragment in &params.filters {
        clause.push(fragment);
    }

    clause.finish()
}

/// Wrap an identifier in double quotes.
fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Escape single quotes in SQL strings.
fn escape_sql(s: &str) -> String {
    s.replace('\'', "''")
}

/// Build a preview of the query call (for display purposes).
pub fn build_query_preview(resource_id: &str, params: &QueryParams) -> String {
    let mut parts = vec![format!("NgEso(\"{resource_id}\").query(")];

    if let Some(col) = &params.date_col {
        parts.push(format!("    date_col=\"{col}\","));
    }
    if let Some(start) = &params.range.start {
        parts.push(format!("    start_date=\"{start}\","));
    }
    if let Some(end) = &params.range.end {
        parts.push(format!("    end_date=\"{end}\","));
    }
    if !params.filters.is_empty() {
        parts.push(format!("    filters={:?},", params.filters));
    }

    parts.push(")".to_string());
    parts.push(build_query(resource_id, params));
    parts.join("\n")
}
