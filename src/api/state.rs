//! Application state for the API server

use crate::export::ExportGuard;
use crate::{Config, Database};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the database and configuration.
#[derive(Clone)]
pub struct AppState {
    /// Owner registry
    pub db: Arc<Database>,

    /// Configuration (read-only at runtime)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Export guard over the registry, bounded by the configured ceiling
    pub fn export_guard(&self) -> ExportGuard<Arc<Database>> {
        ExportGuard::with_max_rows(self.db.clone(), self.config.export.max_rows)
    }
}
