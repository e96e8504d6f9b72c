//! Database layer for petclinic
//!
//! Handles SQLite persistence for the owner registry, its pets, and their visits.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`owners`] - Owner CRUD, search, duplicate detection and export queries
//! - [`visits`] - Pet types, pets, visits and the upcoming-visits query
//!
//! Every query is spelled out as SQL with explicit bind parameters; nothing is
//! derived from method names.
//!
//! SQLite's `LOWER()` and `LIKE` only fold ASCII, so every case-insensitive
//! comparison goes through a `*_lc` column filled with [`fold_case`] on write
//! and compared against a parameter folded the same way.

use crate::Error;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;

mod migrations;
mod owners;
mod visits;

/// New owner to be inserted (or written over an existing row)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Ten-digit telephone number
    pub telephone: Option<String>,
}

/// New pet to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    /// Pet name
    pub name: String,
    /// Pet type name, already case-folded (e.g. "cat")
    pub pet_type: String,
    /// Date of birth, if known
    pub birth_date: Option<NaiveDate>,
}

/// New visit to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    /// Day of the visit
    pub date: NaiveDate,
    /// Reason for the visit
    pub description: String,
}

/// Database handle for petclinic
pub struct Database {
    pool: SqlitePool,
}

/// Unicode case folding used for every `*_lc` column and the values compared against it
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern
///
/// Queries using the result must declare `ESCAPE '\'`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// LIKE pattern matching values that start with `prefix`
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = escape_like(prefix);
    pattern.push('%');
    pattern
}

/// LIKE pattern matching values that contain `fragment`
pub(crate) fn like_contains(fragment: &str) -> String {
    format!("%{}%", escape_like(fragment))
}

/// Turn a unique-index violation into [`Error::Duplicate`], anything else into [`Error::Sqlx`]
pub(crate) fn map_unique_violation(e: sqlx::Error, duplicate: impl FnOnce() -> String) -> Error {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return Error::Duplicate(duplicate());
    }
    Error::Sqlx(e)
}
