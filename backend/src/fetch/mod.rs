//! Dataset retrieval.
//!
//! Fetches the spreadsheet export (or reads a local copy), rejects markup
//! pages served in place of data, and runs the ingestion pipeline.
//!
//! [`DatasetFetcher::fetch`] never fails: any problem is logged and an
//! empty record set is returned. An empty result means "nothing to show",
//! not "retry now". There is no retry, backoff or caching here.
//!
//! ```rust,ignore
//! use annuaire::fetch::DatasetFetcher;
//!
//! let records = DatasetFetcher::new(annuaire::config::export_url(annuaire::config::SHEET_ID)).fetch().await;
//! println!("{} records", records.len());
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Settings, REQUEST_TIMEOUT};
use crate::error::{FetchError, FetchResult};
use crate::logs::{log_error, log_info};
use crate::models::Record;
use crate::parser::decode_auto;
use crate::transform::pipeline::ingest;

/// Where the export comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// HTTP GET, no authentication, whole dataset per call.
    Url(String),
    /// A previously downloaded export.
    File(PathBuf),
}

/// Loads the directory once per session.
#[derive(Debug, Clone)]
pub struct DatasetFetcher {
    source: DataSource,
    client: reqwest::Client,
    timeout: Duration,
}

impl DatasetFetcher {
    /// Fetcher for a remote export URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_source(DataSource::Url(url.into()))
    }

    /// Fetcher reading a local export file.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self::with_source(DataSource::File(path.as_ref().to_path_buf()))
    }

    /// Fetcher for the configured export URL.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.csv_url.clone()).with_timeout(settings.request_timeout)
    }

    pub fn with_source(source: DataSource) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Use a specific HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Best-effort load: the records, or an empty set on any failure.
    pub async fn fetch(&self) -> Vec<Record> {
        match self.try_fetch().await {
            Ok(records) => records,
            Err(e) => {
                log_error(format!("Failed to fetch live data: {}", e));
                Vec::new()
            }
        }
    }

    /// Load and report why it failed, if it did.
    pub async fn try_fetch(&self) -> FetchResult<Vec<Record>> {
        let text = match &self.source {
            DataSource::Url(url) => {
                log_info(format!("Fetching directory from {}", url));
                self.download(url).await?
            }
            DataSource::File(path) => {
                log_info(format!("Reading directory from {}", path.display()));
                decode_auto(&std::fs::read(path)?)
            }
        };

        check_tabular(&text)?;
        Ok(ingest(&text))
    }

    async fn download(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(decode_auto(&bytes))
    }
}

/// Whether a body is an HTML page rather than CSV.
///
/// A sheet that is not shared publicly answers with a sign-in page.
pub fn looks_like_markup(text: &str) -> bool {
    text.trim().starts_with("<!DOCTYPE html>") || text.contains("<html")
}

/// Reject bodies that are markup instead of tabular data.
pub fn check_tabular(text: &str) -> FetchResult<()> {
    if looks_like_markup(text) {
        return Err(FetchError::MarkupResponse);
    }
    Ok(())
}
