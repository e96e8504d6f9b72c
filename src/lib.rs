//! # petclinic
//!
//! Owner registry for a veterinary clinic, with a bounded CSV export.
//!
//! The core of the crate is the export pipeline:
//! - [`csv`] turns owner records into RFC 4180-style CSV text
//! - [`export::ExportGuard`] fetches owners by last-name prefix, refuses empty
//!   and oversized result sets, and attaches download metadata
//! - [`api`] serves the export over HTTP, next to owner search and editing,
//!   pets, visit booking, and the upcoming-visits schedule
//!
//! ## Quick Start
//!
//! ```no_run
//! use petclinic::{Config, Database, ExportGuard};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let db = Arc::new(Database::new(&config.persistence.database_path).await?);
//!
//!     let guard = ExportGuard::with_max_rows(db, config.export.max_rows);
//!     let export = guard.export("Dav").await?;
//!
//!     println!("{} owners -> {}", export.row_count, export.filename);
//!     print!("{}", export.body);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// CSV encoding of owner records
pub mod csv;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Bounded CSV export
pub mod export;
/// Logging setup
pub mod logging;
/// Core owner, pet and visit types
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use csv::{OwnerRecord, encode_owners};
pub use db::{Database, NewOwner, NewPet, NewVisit};
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, Result, ToHttpStatus};
pub use export::{CsvExport, ExportGuard, MAX_EXPORT_ROWS, OwnerSource};
pub use types::{
    Owner, OwnerForm, OwnerPage, OwnerSearch, Pet, PetForm, PetType, UpcomingVisit,
    UpcomingVisitFilter, Visit, VisitForm,
};

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
///
/// Pass it to [`api::start_api_server`] so the server drains in-flight
/// requests before the process exits.
pub async fn shutdown_signal() {
    let signal = stop_requested().await;
    tracing::info!(signal, "Shutdown requested, draining in-flight requests");
}

#[cfg(unix)]
async fn stop_requested() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = ctrl_c() => "SIGINT",
        },
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, stopping on Ctrl+C only");
            ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn stop_requested() -> &'static str {
    ctrl_c().await
}

/// Waits for Ctrl+C; if it cannot be watched, never resolves
async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl+C; stop the server with SIGTERM or kill");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
