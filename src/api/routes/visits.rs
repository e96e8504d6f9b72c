//! Pet, visit and upcoming-schedule handlers.

use super::UpcomingVisitsQuery;
use crate::api::AppState;
use crate::error::ApiError;
use crate::types::{Pet, PetForm, PetType, UpcomingVisit, UpcomingVisitFilter, Visit, VisitForm};
use crate::{Error, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an optional `YYYY-MM-DD` query value, treating blank as absent
fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| Error::Validation(format!("{field} must be a date as YYYY-MM-DD, got {v:?}"))),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn require_owner(state: &AppState, owner_id: i64) -> Result<()> {
    match state.db.get_owner(owner_id).await? {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(format!("owner {}", owner_id))),
    }
}

async fn require_pet(state: &AppState, owner_id: i64, pet_id: i64) -> Result<Pet> {
    state
        .db
        .get_pet(owner_id, pet_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("pet {} of owner {}", pet_id, owner_id)))
}

/// GET /pet-types - List the kinds of pets the clinic treats
#[utoipa::path(
    get,
    path = "/pet-types",
    tag = "visits",
    responses(
        (status = 200, description = "Pet types, alphabetically", body = Vec<PetType>),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_pet_types(State(state): State<AppState>) -> Result<Json<Vec<PetType>>> {
    Ok(Json(state.db.list_pet_types().await?))
}

/// GET /owners/:id/pets - List an owner's pets
#[utoipa::path(
    get,
    path = "/owners/{id}/pets",
    tag = "visits",
    params(
        ("id" = i64, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "The owner's pets", body = Vec<Pet>),
        (status = 404, description = "Owner not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_pets(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<Pet>>> {
    require_owner(&state, owner_id).await?;
    Ok(Json(state.db.list_pets(owner_id).await?))
}

/// POST /owners/:id/pets - Add a pet to an owner
#[utoipa::path(
    post,
    path = "/owners/{id}/pets",
    tag = "visits",
    params(
        ("id" = i64, Path, description = "Owner ID")
    ),
    request_body(content = PetForm, description = "Pet details"),
    responses(
        (status = 201, description = "Pet created", body = Pet),
        (status = 400, description = "Invalid pet details or unknown pet type", body = ApiError),
        (status = 404, description = "Owner not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn create_pet(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
    Json(form): Json<PetForm>,
) -> Result<Response> {
    require_owner(&state, owner_id).await?;
    let pet = form.validate_on(today())?;

    let id = state.db.insert_pet(owner_id, &pet).await?;
    tracing::info!(owner_id, pet_id = id, "Pet created");

    let created = require_pet(&state, owner_id, id).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /owners/:id/pets/:pet_id/visits - List a pet's visits
#[utoipa::path(
    get,
    path = "/owners/{id}/pets/{pet_id}/visits",
    tag = "visits",
    params(
        ("id" = i64, Path, description = "Owner ID"),
        ("pet_id" = i64, Path, description = "Pet ID")
    ),
    responses(
        (status = 200, description = "The pet's visits, oldest first", body = Vec<Visit>),
        (status = 404, description = "Pet not found for this owner", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_visits(
    State(state): State<AppState>,
    Path((owner_id, pet_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<Visit>>> {
    require_pet(&state, owner_id, pet_id).await?;
    Ok(Json(state.db.list_visits(pet_id).await?))
}

/// POST /owners/:id/pets/:pet_id/visits - Book a visit for a pet
#[utoipa::path(
    post,
    path = "/owners/{id}/pets/{pet_id}/visits",
    tag = "visits",
    params(
        ("id" = i64, Path, description = "Owner ID"),
        ("pet_id" = i64, Path, description = "Pet ID")
    ),
    request_body(content = VisitForm, description = "Visit details; the date defaults to today"),
    responses(
        (status = 201, description = "Visit booked", body = Visit),
        (status = 400, description = "Visit date in the past or blank description", body = ApiError),
        (status = 404, description = "Pet not found for this owner", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn create_visit(
    State(state): State<AppState>,
    Path((owner_id, pet_id)): Path<(i64, i64)>,
    Json(form): Json<VisitForm>,
) -> Result<Response> {
    require_pet(&state, owner_id, pet_id).await?;
    let visit = form.validate_on(today())?;

    let id = state.db.insert_visit(pet_id, &visit).await?;
    tracing::info!(pet_id, visit_id = id, date = %visit.date, "Visit booked");

    let created = Visit {
        id,
        pet_id,
        date: visit.date,
        description: visit.description,
    };
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /visits/upcoming - Visits from a day onward, earliest first
#[utoipa::path(
    get,
    path = "/visits/upcoming",
    tag = "visits",
    params(UpcomingVisitsQuery),
    responses(
        (status = 200, description = "Matching visits with pet and owner, possibly none", body = Vec<UpcomingVisit>),
        (status = 400, description = "Malformed date", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn upcoming_visits(
    State(state): State<AppState>,
    Query(query): Query<UpcomingVisitsQuery>,
) -> Result<Json<Vec<UpcomingVisit>>> {
    let from = parse_date("from_date", query.from_date.as_deref())?.unwrap_or_else(today);
    let filter = UpcomingVisitFilter {
        from,
        to: parse_date("to_date", query.to_date.as_deref())?,
        pet_type: present(query.pet_type),
        owner_last_name: present(query.owner_last_name),
    };

    let visits = state.db.find_upcoming_visits(&filter).await?;
    tracing::debug!(from = %filter.from, count = visits.len(), "Upcoming visits listed");
    Ok(Json(visits))
}
