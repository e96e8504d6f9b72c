//! Core owner, pet and visit types shared by the database, export, and API layers

use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::LazyLock;
use utoipa::ToSchema;

/// Number of owners per page in paginated search results
pub const OWNERS_PAGE_SIZE: u32 = 5;

static TELEPHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\d{10}$").unwrap()
});

/// A pet owner as stored in the registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Owner {
    /// Unique database ID
    pub id: i64,

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

/// Request body for creating or updating an owner
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OwnerForm {
    /// Owner ID; only meaningful on update, where it must match the path
    #[serde(default)]
    pub id: Option<i64>,

    /// Given name (required)
    #[serde(default, alias = "firstName")]
    pub first_name: String,

    /// Family name (required)
    #[serde(default, alias = "lastName")]
    pub last_name: String,

    /// Street address (required)
    #[serde(default)]
    pub address: String,

    /// City (required)
    #[serde(default)]
    pub city: String,

    /// Telephone; spaces and dashes are stripped, then exactly 10 digits are required
    #[serde(default)]
    pub telephone: String,
}

impl OwnerForm {
    /// Validate the form and produce the normalized record to persist
    ///
    /// Collects every field problem into one message so clients can fix them
    /// in a single round trip.
    pub fn validate(&self) -> Result<crate::db::NewOwner> {
        let mut problems = Vec::new();

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let address = self.address.trim();
        let city = self.city.trim();
        let telephone = normalize_telephone(&self.telephone);

        for (field, value) in [
            ("first_name", first_name),
            ("last_name", last_name),
            ("address", address),
            ("city", city),
        ] {
            if value.is_empty() {
                problems.push(format!("{field} must not be blank"));
            }
        }
        if !TELEPHONE_PATTERN.is_match(&telephone) {
            problems.push("telephone must be exactly 10 digits".to_string());
        }

        if !problems.is_empty() {
            return Err(Error::Validation(problems.join("; ")));
        }

        Ok(crate::db::NewOwner {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            address: Some(address.to_string()),
            city: Some(city.to_string()),
            telephone: Some(telephone),
        })
    }
}

/// Optional criteria for the owner search
///
/// Each criterion left as `None` does not restrict the result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerSearch {
    /// Case-insensitive last name prefix
    pub last_name: Option<String>,
    /// Telephone prefix
    pub telephone: Option<String>,
    /// Case-insensitive exact city
    pub city: Option<String>,
}

impl OwnerSearch {
    /// Build criteria from raw query values, treating blank strings as absent
    pub fn from_params(
        last_name: Option<String>,
        telephone: Option<String>,
        city: Option<String>,
    ) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            last_name: present(last_name),
            telephone: present(telephone),
            city: present(city),
        }
    }
}

/// One page of owner search results
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerPage {
    /// Owners on this page
    pub items: Vec<Owner>,
    /// 1-based page number
    pub current_page: u32,
    /// Total number of pages for the search
    pub total_pages: u32,
    /// Total number of matching owners
    pub total_items: i64,
}

impl OwnerPage {
    /// Number of pages needed for `total_items` at [`OWNERS_PAGE_SIZE`] per page
    pub fn page_count(total_items: i64) -> u32 {
        let size = i64::from(OWNERS_PAGE_SIZE);
        let pages = (total_items.max(0) + size - 1) / size;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// A kind of pet the clinic treats
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PetType {
    /// Unique database ID
    pub id: i64,
    /// Lowercase type name, e.g. "cat"
    pub name: String,
}

/// A pet belonging to an owner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Pet {
    /// Unique database ID
    pub id: i64,
    /// Owning owner's ID
    pub owner_id: i64,
    /// Pet name
    pub name: String,
    /// Date of birth, if known
    pub birth_date: Option<NaiveDate>,
    /// Pet type name
    pub pet_type: String,
}

/// Request body for adding a pet to an owner
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PetForm {
    /// Pet name (required)
    #[serde(default)]
    pub name: String,

    /// Pet type name, matched ignoring case (required)
    #[serde(default, alias = "petType", alias = "type")]
    pub pet_type: String,

    /// Date of birth; must not be in the future
    #[serde(default, alias = "birthDate")]
    pub birth_date: Option<NaiveDate>,
}

impl PetForm {
    /// Validate the form against `today` and produce the record to persist
    pub fn validate_on(&self, today: NaiveDate) -> Result<crate::db::NewPet> {
        let mut problems = Vec::new();

        let name = self.name.trim();
        let pet_type = self.pet_type.trim();
        if name.is_empty() {
            problems.push("name must not be blank".to_string());
        }
        if pet_type.is_empty() {
            problems.push("pet_type must not be blank".to_string());
        }
        if let Some(birth_date) = self.birth_date
            && birth_date > today
        {
            problems.push("birth_date cannot be in the future".to_string());
        }

        if !problems.is_empty() {
            return Err(Error::Validation(problems.join("; ")));
        }

        Ok(crate::db::NewPet {
            name: name.to_string(),
            pet_type: crate::db::fold_case(pet_type),
            birth_date: self.birth_date,
        })
    }
}

/// A recorded visit of a pet to the clinic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Visit {
    /// Unique database ID
    pub id: i64,
    /// Visiting pet's ID
    pub pet_id: i64,
    /// Day of the visit
    pub date: NaiveDate,
    /// Reason for the visit
    pub description: String,
}

/// Request body for booking a visit
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VisitForm {
    /// Day of the visit; defaults to today, and must not be in the past
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Reason for the visit (required)
    #[serde(default)]
    pub description: String,
}

impl VisitForm {
    /// Validate the form against `today` and produce the record to persist
    pub fn validate_on(&self, today: NaiveDate) -> Result<crate::db::NewVisit> {
        let mut problems = Vec::new();

        let date = self.date.unwrap_or(today);
        if date < today {
            problems.push("Visit date cannot be in the past".to_string());
        }
        let description = self.description.trim();
        if description.is_empty() {
            problems.push("description must not be blank".to_string());
        }

        if !problems.is_empty() {
            return Err(Error::Validation(problems.join("; ")));
        }

        Ok(crate::db::NewVisit {
            date,
            description: description.to_string(),
        })
    }
}

/// A future visit joined with its pet and owner, for the clinic's schedule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UpcomingVisit {
    /// Visit ID
    pub visit_id: i64,
    /// Day of the visit
    pub date: NaiveDate,
    /// Reason for the visit
    pub description: String,
    /// Pet ID
    pub pet_id: i64,
    /// Pet name
    pub pet_name: String,
    /// Pet type name
    pub pet_type: String,
    /// Owner ID
    pub owner_id: i64,
    /// Owner's given name
    pub owner_first_name: String,
    /// Owner's family name
    pub owner_last_name: String,
}

/// Criteria for the upcoming-visits schedule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpcomingVisitFilter {
    /// Earliest visit day, inclusive
    pub from: NaiveDate,
    /// Latest visit day, inclusive; `None` for no upper bound
    pub to: Option<NaiveDate>,
    /// Pet type name, matched exactly ignoring case
    pub pet_type: Option<String>,
    /// Fragment of the owner's last name, matched anywhere ignoring case
    pub owner_last_name: Option<String>,
}

/// Strip spaces and dashes from a telephone number
pub fn normalize_telephone(telephone: &str) -> String {
    telephone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}
