//! Owner registry handlers.

use super::OwnerSearchQuery;
use crate::api::AppState;
use crate::error::ApiError;
use crate::types::{OWNERS_PAGE_SIZE, Owner, OwnerForm, OwnerPage, OwnerSearch, normalize_telephone};
use crate::{Error, Result};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /owners - Search owners, one page at a time
#[utoipa::path(
    get,
    path = "/owners",
    tag = "owners",
    params(OwnerSearchQuery),
    responses(
        (status = 200, description = "One page of matching owners", body = OwnerPage),
        (status = 400, description = "Invalid page number", body = ApiError),
        (status = 404, description = "No owners match the criteria", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_owners(
    State(state): State<AppState>,
    Query(query): Query<OwnerSearchQuery>,
) -> Result<Json<OwnerPage>> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(Error::Validation("page must be 1 or greater".to_string()));
    }

    let search = OwnerSearch::from_params(
        query.last_name,
        query.telephone.as_deref().map(normalize_telephone),
        query.city,
    );

    let total_items = state.db.count_owners(&search).await?;
    if total_items == 0 {
        return Err(Error::NotFound(
            "no owners found matching the search criteria".to_string(),
        ));
    }

    let offset = (page - 1).saturating_mul(OWNERS_PAGE_SIZE);
    let items = state
        .db
        .search_owners(&search, OWNERS_PAGE_SIZE, offset)
        .await?;

    Ok(Json(OwnerPage {
        items,
        current_page: page,
        total_pages: OwnerPage::page_count(total_items),
        total_items,
    }))
}

/// POST /owners - Register a new owner
#[utoipa::path(
    post,
    path = "/owners",
    tag = "owners",
    request_body(content = OwnerForm, description = "Owner details"),
    responses(
        (status = 201, description = "Owner created", body = Owner),
        (status = 400, description = "Invalid owner details", body = ApiError),
        (status = 409, description = "An owner with the same names and telephone exists", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn create_owner(
    State(state): State<AppState>,
    Json(form): Json<OwnerForm>,
) -> Result<Response> {
    let owner = form.validate()?;

    if let Some(telephone) = owner.telephone.as_deref() {
        let duplicates = state
            .db
            .find_duplicate_owners(&owner.first_name, &owner.last_name, telephone)
            .await?;
        if !duplicates.is_empty() {
            tracing::debug!(
                first_name = %owner.first_name,
                last_name = %owner.last_name,
                "Rejected duplicate owner"
            );
            return Err(Error::Duplicate(format!(
                "{} {} with telephone {} is already registered",
                owner.first_name, owner.last_name, telephone
            )));
        }
    }

    let id = state.db.insert_owner(&owner).await?;
    tracing::info!(owner_id = id, "Owner created");

    let created = state
        .db
        .get_owner(id)
        .await?
        .ok_or_else(|| Error::Other(format!("owner {} vanished after insert", id)))?;

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /owners/:id - Get a single owner
#[utoipa::path(
    get,
    path = "/owners/{id}",
    tag = "owners",
    params(
        ("id" = i64, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "Owner details", body = Owner),
        (status = 404, description = "Owner not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn get_owner(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.db.get_owner(id).await {
        Ok(Some(owner)) => (StatusCode::OK, Json(owner)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("owner {}", id))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to get owner {}: {}", id, e);
            e.into_response()
        }
    }
}

/// PUT /owners/:id - Replace an owner's details
#[utoipa::path(
    put,
    path = "/owners/{id}",
    tag = "owners",
    params(
        ("id" = i64, Path, description = "Owner ID")
    ),
    request_body(content = OwnerForm, description = "Replacement owner details"),
    responses(
        (status = 200, description = "Owner updated", body = Owner),
        (status = 400, description = "Invalid owner details or mismatched ID", body = ApiError),
        (status = 404, description = "Owner not found", body = ApiError),
        (status = 409, description = "Another owner has the same names and telephone", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn update_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<OwnerForm>,
) -> Result<Json<Owner>> {
    if let Some(body_id) = form.id
        && body_id != id
    {
        return Err(Error::Validation(format!(
            "owner id in body ({}) does not match path ({})",
            body_id, id
        )));
    }

    let owner = form.validate()?;

    if !state.db.update_owner(id, &owner).await? {
        return Err(Error::NotFound(format!("owner {}", id)));
    }
    tracing::info!(owner_id = id, "Owner updated");

    state
        .db
        .get_owner(id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("owner {}", id)))
}
