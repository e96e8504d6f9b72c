//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`owners`] - Owner registry: search, create, read, update
//! - [`visits`] - Pet types, pets, visits, and the upcoming-visits schedule
//! - [`export`] - Bounded CSV download of owners
//! - [`system`] - Health, OpenAPI

use serde::{Deserialize, Serialize};

mod export;
mod owners;
mod system;
mod visits;

// Re-export all handlers so `routes::function_name` continues to work
pub use export::*;
pub use owners::*;
pub use system::*;
pub use visits::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /owners.csv
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Last name prefix (case-insensitive), used as given; absent or empty exports every owner
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
}

/// Query parameters for GET /owners
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerSearchQuery {
    /// Last name prefix (case-insensitive)
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    /// Telephone prefix; spaces and dashes are ignored
    #[serde(default)]
    pub telephone: Option<String>,
    /// City (case-insensitive exact match)
    #[serde(default)]
    pub city: Option<String>,
    /// 1-based page number (default: 1)
    #[serde(default)]
    pub page: Option<u32>,
}

/// Query parameters for GET /visits/upcoming
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpcomingVisitsQuery {
    /// Earliest visit day, `YYYY-MM-DD` (default: today)
    #[serde(default, alias = "fromDate")]
    pub from_date: Option<String>,
    /// Latest visit day, `YYYY-MM-DD`, inclusive
    #[serde(default, alias = "toDate")]
    pub to_date: Option<String>,
    /// Pet type name (case-insensitive exact match)
    #[serde(default, alias = "petType")]
    pub pet_type: Option<String>,
    /// Fragment of the owner's last name (case-insensitive)
    #[serde(default, alias = "ownerLastName")]
    pub owner_last_name: Option<String>,
}
