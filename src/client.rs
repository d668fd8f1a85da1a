//! Blocking HTTP client for the ESO data portal.

use crate::config::Config;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::query::build_query;
use crate::response::{check_envelope, check_status, PackageInfo, ResourceInfo, SqlResult};
use crate::types::{AccessMode, DatasetRef, DateInput, NgEsoError, QueryParams, Result};

use reqwest::blocking::Client;
use std::sync::Arc;
use url::Url;

/// SQL execution action.
const SQL_ACTION: &str = "datastore_search_sql";

/// Resource metadata action.
const RESOURCE_SHOW_ACTION: &str = "resource_show";

/// Package metadata action.
const PACKAGE_SHOW_ACTION: &str = "package_show";

/// A client bound to one portal resource.
///
/// The access mode decides how [`NgEso::for_package`] resolves a package to a
/// resource. It does not gate the operations: [`NgEso::query`] and
/// [`NgEso::download_file`] both work on any bound resource, and a resource
/// without a datastore table is reported by the portal as an unsuccessful
/// request.
pub struct NgEso {
    client: Client,
    base_url: Url,
    dataset: DatasetRef,
    sink: Arc<dyn DiagnosticSink>,
}

impl NgEso {
    /// Create a client for a resource in query mode, loading config from the
    /// default location.
    pub fn new(resource_id: impl Into<String>) -> Result<Self> {
        Self::with_mode(resource_id, AccessMode::Query)
    }

    /// Create a client for a resource with an explicit access mode.
    pub fn with_mode(resource_id: impl Into<String>, mode: AccessMode) -> Result<Self> {
        let config = Config::load()?;
        Self::with_config(DatasetRef::new(resource_id, mode), config)
    }

    /// Create a client with the given config.
    pub fn with_config(dataset: DatasetRef, config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: action_base(&config.base_url)?,
            dataset,
            sink: Arc::new(LogSink),
        })
    }

    /// Create a client for a catalogue package (e.g.
    /// `historic-day-ahead-demand-forecast`), resolving it to one of its
    /// resources.
    ///
    /// Query mode picks the first resource loaded into the datastore; file
    /// mode picks the first resource with a download URL.
    pub fn for_package(package: &str, mode: AccessMode, config: Config) -> Result<Self> {
        let mut eso = Self::with_config(DatasetRef::new(package, mode), config)?;
        let package_info: PackageInfo = eso.action(PACKAGE_SHOW_ACTION, &[("id", package)])?;

        let resource = package_info
            .resources
            .into_iter()
            .find(|r| match mode {
                AccessMode::Query => r.datastore_active,
                AccessMode::File => r.url.as_deref().is_some_and(|u| !u.is_empty()),
            })
            .ok_or_else(|| {
                NgEsoError::Metadata(format!(
                    "package {} has no resource usable in {:?} mode",
                    package, mode
                ))
            })?;

        log::debug!("package {} resolved to resource {}", package, resource.id);
        eso.dataset = DatasetRef::new(resource.id, mode);
        Ok(eso)
    }

    /// Replace the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The bound dataset.
    pub fn dataset(&self) -> &DatasetRef {
        &self.dataset
    }

    /// Query the datastore and return the raw JSON response body.
    ///
    /// Date bounds are inclusive and apply to `date_col`; `filters` are
    /// pre-formatted SQL fragments AND-ed after them. A successful query
    /// with no matching records is not an error: a "No data found"
    /// diagnostic is emitted and the (empty) response is returned.
    pub fn query(
        &self,
        date_col: &str,
        start_date: Option<DateInput>,
        end_date: Option<DateInput>,
        filters: &[&str],
    ) -> Result<Vec<u8>> {
        let mut params = QueryParams::new().date_col(date_col);
        params.range.start = start_date;
        params.range.end = end_date;
        params.filters = filters.iter().map(|f| f.to_string()).collect();
        self.query_with(&params)
    }

    /// Query the datastore with prepared parameters.
    pub fn query_with(&self, params: &QueryParams) -> Result<Vec<u8>> {
        let sql = build_query(self.dataset.resource_id(), params);
        self.execute_query(&sql, params)
    }

    /// Execute a raw SQL statement.
    pub fn execute_sql(&self, sql: &str) -> Result<Vec<u8>> {
        self.execute_query(sql, &QueryParams::new())
    }

    fn execute_query(&self, sql: &str, params: &QueryParams) -> Result<Vec<u8>> {
        let url = self.base_url.join(SQL_ACTION)?;
        log::debug!(
            "querying {} via {}: {}",
            self.dataset.resource_id(),
            url,
            sql
        );

        let response = self.client.get(url).query(&[("sql", sql)]).send()?;
        let status = response.status();
        let body = response.bytes()?;

        let envelope = check_envelope::<SqlResult>(status, &body)?;
        let records = envelope.result.map(|r| r.records.len()).unwrap_or(0);
        if records == 0 {
            self.sink
                .emit(&Diagnostic::no_data(self.dataset.resource_id(), &params.range));
        } else {
            log::debug!("{} records from {}", records, self.dataset.resource_id());
        }

        Ok(body.to_vec())
    }

    /// Look up the download URL of the bound resource.
    pub fn resource_url(&self) -> Result<String> {
        let info: ResourceInfo =
            self.action(RESOURCE_SHOW_ACTION, &[("id", self.dataset.resource_id())])?;
        info.url.filter(|u| !u.is_empty()).ok_or_else(|| {
            NgEsoError::Metadata(format!(
                "resource {} has no download URL",
                self.dataset.resource_id()
            ))
        })
    }

    /// Download the bound resource's file and return its bytes unmodified.
    pub fn download_file(&self) -> Result<Vec<u8>> {
        let url = self.resource_url()?;
        log::debug!("downloading {} from {}", self.dataset.resource_id(), url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.bytes()?;
        check_status(status, &body)?;

        Ok(body.to_vec())
    }

    /// Call a metadata action and return its `result`.
    fn action<T>(&self, action: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.base_url.join(action)?;
        let response = self.client.get(url).query(params).send()?;
        let status = response.status();
        let body = response.bytes()?;

        check_envelope::<T>(status, &body)?
            .result
            .ok_or_else(|| NgEsoError::Metadata(format!("{} returned no result", action)))
    }
}

/// Parse the base URL, ensuring a trailing slash so actions join beneath it.
fn action_base(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    Ok(Url::parse(&format!("{}/", trimmed))?)
}
