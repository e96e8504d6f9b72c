//! Bounded owner CSV export
//!
//! [`ExportGuard`] fetches every owner matching a last-name prefix, rejects
//! empty and oversized result sets before any encoding happens, and wraps the
//! encoded body with the headers a browser needs to download it as a file.

use crate::csv::{OwnerRecord, encode_owners};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Default ceiling on the number of owners in one export
pub const MAX_EXPORT_ROWS: usize = 5000;

/// Content type of the export body
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=UTF-8";

/// Cache-Control directives preventing any caching of the export
pub const NO_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Legacy HTTP/1.0 cache directive
pub const NO_CACHE_PRAGMA: &str = "no-cache";

/// Expires value for an already-expired response (the Unix epoch)
pub const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Source of owner records for export
///
/// The persistence layer implements this; tests substitute in-memory sources.
#[async_trait]
pub trait OwnerSource: Send + Sync {
    /// Return every owner whose last name starts with `prefix` (case-insensitive)
    ///
    /// An empty prefix selects every owner. Results are unpaginated and in a
    /// stable order.
    async fn fetch_by_last_name_prefix(&self, prefix: &str) -> Result<Vec<OwnerRecord>>;
}

#[async_trait]
impl<S: OwnerSource + ?Sized> OwnerSource for Arc<S> {
    async fn fetch_by_last_name_prefix(&self, prefix: &str) -> Result<Vec<OwnerRecord>> {
        (**self).fetch_by_last_name_prefix(prefix).await
    }
}

/// Encoded CSV export plus its transport metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    /// CSV text (header row plus one row per owner)
    pub body: String,
    /// Download filename, `owners-export-YYYY-MM-DD.csv`
    pub filename: String,
    /// Number of owners in the body
    pub row_count: usize,
}

impl CsvExport {
    /// Content-Type header value
    pub fn content_type(&self) -> &'static str {
        CSV_CONTENT_TYPE
    }

    /// Content-Disposition header value instructing download as an attachment
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Cache-prevention headers as (name, value) pairs
    pub fn cache_headers(&self) -> [(&'static str, &'static str); 3] {
        [
            ("cache-control", NO_CACHE_CONTROL),
            ("pragma", NO_CACHE_PRAGMA),
            ("expires", EXPIRED),
        ]
    }
}

/// Filename for an export produced on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("owners-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Export orchestration: fetch, bound, encode, describe
///
/// Stateless apart from the immutable ceiling, so one guard can serve any
/// number of concurrent requests.
pub struct ExportGuard<S> {
    source: S,
    max_rows: usize,
}

impl<S: OwnerSource> ExportGuard<S> {
    /// Create a guard with the default ceiling of [`MAX_EXPORT_ROWS`]
    pub fn new(source: S) -> Self {
        Self::with_max_rows(source, MAX_EXPORT_ROWS)
    }

    /// Create a guard with a custom ceiling
    pub fn with_max_rows(source: S, max_rows: usize) -> Self {
        Self { source, max_rows }
    }

    /// The configured ceiling
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Export owners whose last name starts with `last_name_prefix`, dated today
    pub async fn export(&self, last_name_prefix: &str) -> Result<CsvExport> {
        let today = chrono::Local::now().date_naive();
        self.export_on(last_name_prefix, today).await
    }

    /// Export owners whose last name starts with `last_name_prefix`, dated `date`
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when nothing matches
    /// - [`Error::PayloadTooLarge`] when more than the ceiling matches
    /// - any error from the owner source
    pub async fn export_on(&self, last_name_prefix: &str, date: NaiveDate) -> Result<CsvExport> {
        let owners = self
            .source
            .fetch_by_last_name_prefix(last_name_prefix)
            .await?;

        if owners.is_empty() {
            tracing::debug!(prefix = %last_name_prefix, "CSV export matched no owners");
            return Err(Error::NotFound(
                "no owners found matching the search criteria".to_string(),
            ));
        }

        if owners.len() > self.max_rows {
            tracing::warn!(
                prefix = %last_name_prefix,
                count = owners.len(),
                max = self.max_rows,
                "CSV export rejected: result set exceeds ceiling"
            );
            return Err(Error::PayloadTooLarge {
                count: owners.len(),
                max: self.max_rows,
            });
        }

        let body = encode_owners(&owners);

        tracing::info!(
            prefix = %last_name_prefix,
            rows = owners.len(),
            bytes = body.len(),
            "CSV export generated"
        );

        Ok(CsvExport {
            body,
            filename: export_filename(date),
            row_count: owners.len(),
        })
    }
}
