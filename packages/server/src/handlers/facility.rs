use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{facility, matches};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::facility::*;
use crate::state::AppState;
use crate::utils::access::{find_organization, require_member, require_owner};

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}/facilities",
    tag = "Facilities",
    operation_id = "listFacilities",
    summary = "List the facilities of an organization",
    description = "Each facility carries `embed_url`, an embeddable maps URL derived from the stored location when one can be derived.",
    params(("id" = i32, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Facilities", body = Vec<FacilityResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_facilities(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<FacilityResponse>>, AppError> {
    let org = find_organization(&state.db, id).await?;
    require_member(&state.db, &org, auth_user.user_id).await?;

    let rows = facility::Entity::find()
        .filter(facility::Column::OrganizationId.eq(id))
        .order_by_asc(facility::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/facilities",
    tag = "Facilities",
    operation_id = "createFacility",
    summary = "Add a facility",
    description = "Owner only. `location` is stored as entered (maps link, iframe snippet, coordinates or address), up to 4096 characters.",
    params(("id" = i32, Path, description = "Organization ID")),
    request_body = CreateFacilityRequest,
    responses(
        (status = 201, description = "Facility created", body = FacilityResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, name = %payload.name))]
pub async fn create_facility(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateFacilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_facility(&payload)?;

    let org = find_organization(&state.db, id).await?;
    require_owner(&org, auth_user.user_id)?;

    let now = chrono::Utc::now();
    let model = facility::ActiveModel {
        organization_id: Set(id),
        name: Set(payload.name.trim().to_string()),
        location: Set(payload.location.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(organization_id = id, facility_id = model.id, "Created facility");
    Ok((StatusCode::CREATED, Json(FacilityResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/facilities/{id}",
    tag = "Facilities",
    operation_id = "updateFacility",
    summary = "Update a facility",
    description = "Owner of the facility's organization only.",
    params(("id" = i32, Path, description = "Facility ID")),
    request_body = UpdateFacilityRequest,
    responses(
        (status = 200, description = "Facility updated", body = FacilityResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Facility not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_facility(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFacilityRequest>,
) -> Result<Json<FacilityResponse>, AppError> {
    validate_update_facility(&payload)?;

    let existing = find_facility(&state.db, id).await?;
    let org = find_organization(&state.db, existing.organization_id).await?;
    require_owner(&org, auth_user.user_id)?;

    if payload == UpdateFacilityRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: facility::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref location) = payload.location {
        active.location = Set(location.trim().to_string());
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{id}",
    tag = "Facilities",
    operation_id = "deleteFacility",
    summary = "Delete a facility",
    description = "Owner only. Matches that used the facility keep their venue text and lose the link.",
    params(("id" = i32, Path, description = "Facility ID")),
    responses(
        (status = 204, description = "Facility deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Facility not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_facility(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_facility(&state.db, id).await?;
    let org = find_organization(&state.db, existing.organization_id).await?;
    require_owner(&org, auth_user.user_id)?;

    let txn = state.db.begin().await?;
    let detached = matches::Entity::update_many()
        .col_expr(matches::Column::FacilityId, Expr::value(Option::<i32>::None))
        .filter(matches::Column::FacilityId.eq(id))
        .exec(&txn)
        .await?;
    facility::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(facility_id = id, matches = detached.rows_affected, "Deleted facility");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_facility<C: ConnectionTrait>(db: &C, id: i32) -> Result<facility::Model, AppError> {
    facility::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Facility not found".into()))
}
