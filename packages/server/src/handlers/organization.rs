use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::MemberStatus;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    facility, match_attendance, match_rating, match_roster, match_score, matches, organization,
    organization_member, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::organization::*;
use crate::models::shared::normalize_optional;
use crate::state::AppState;
use crate::utils::access::{Standing, find_organization, find_organization_for_update, require_owner, standing};

#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    tag = "Organizations",
    operation_id = "listOrganizations",
    summary = "List the caller's organizations",
    description = "Returns the organizations the caller owns or holds an approved membership in, oldest first.",
    responses(
        (status = 200, description = "Organizations", body = Vec<OrganizationListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_organizations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrganizationListItem>>, AppError> {
    let memberships: HashMap<i32, _> = organization_member::Entity::find()
        .filter(organization_member::Column::UserId.eq(auth_user.user_id))
        .filter(organization_member::Column::Status.eq(MemberStatus::Approved))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|m| (m.organization_id, m.role))
        .collect();

    let orgs = organization::Entity::find()
        .filter(
            Condition::any()
                .add(organization::Column::OwnerId.eq(auth_user.user_id))
                .add(organization::Column::Id.is_in(memberships.keys().copied())),
        )
        .order_by_asc(organization::Column::CreatedAt)
        .order_by_asc(organization::Column::Id)
        .all(&state.db)
        .await?;

    let items = orgs
        .into_iter()
        .map(|org| {
            let is_owner = org.owner_id == auth_user.user_id;
            let member_role = if is_owner {
                None
            } else {
                memberships.get(&org.id).copied()
            };
            OrganizationListItem {
                organization: org.into(),
                is_owner,
                member_role,
            }
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    tag = "Organizations",
    operation_id = "createOrganization",
    summary = "Create an organization",
    description = "Creates an organization owned by the caller. Requires the `ADMIN` role. `plan` defaults to the caller's plan; a FREE account cannot open a PREMIUM organization. `max_players` follows the plan.",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED) or plan not purchased (PLAN_LIMIT_REACHED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, name = %payload.name))]
pub async fn create_organization(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_organization(&payload)?;

    let owner = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let plan = payload.plan.unwrap_or(owner.plan);
    if !owner.plan.allows(plan) {
        return Err(AppError::PlanLimit(format!(
            "Your account is on the {} plan; upgrade to open a {} organization",
            owner.plan, plan
        )));
    }

    let now = chrono::Utc::now();
    let model = organization::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(normalize_optional(payload.description)),
        owner_id: Set(owner.id),
        plan: Set(plan),
        max_players: Set(plan.max_players()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(organization_id = model.id, plan = %plan, "Created organization");
    Ok((StatusCode::CREATED, Json(OrganizationResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}",
    tag = "Organizations",
    operation_id = "getOrganization",
    summary = "Get an organization",
    description = "Visible to the owner and approved members. Returns 404 (not 403) to everyone else.",
    params(("id" = i32, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization", body = OrganizationListItem),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_organization(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrganizationListItem>, AppError> {
    let org = find_organization(&state.db, id).await?;
    let standing = standing(&state.db, &org, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

    let member_role = match standing {
        Standing::Owner => None,
        Standing::Member(role) => Some(role),
    };
    Ok(Json(OrganizationListItem {
        organization: org.into(),
        is_owner: standing.is_owner(),
        member_role,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/organizations/{id}",
    tag = "Organizations",
    operation_id = "updateOrganization",
    summary = "Update an organization",
    description = "Owner only. `description: null` clears the description. An empty payload returns the organization unchanged.",
    params(("id" = i32, Path, description = "Organization ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_organization(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateOrganizationRequest>,
) -> Result<Json<OrganizationResponse>, AppError> {
    validate_update_organization(&payload)?;

    let org = find_organization(&state.db, id).await?;
    require_owner(&org, auth_user.user_id)?;

    if payload == UpdateOrganizationRequest::default() {
        return Ok(Json(org.into()));
    }

    let mut active: organization::ActiveModel = org.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(normalize_optional(description));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}",
    tag = "Organizations",
    operation_id = "deleteOrganization",
    summary = "Delete an organization",
    description = "Owner only. Permanently deletes the organization with its memberships, matches (roster, score, attendance and ratings included) and facilities.",
    params(("id" = i32, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_organization(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let org = find_organization_for_update(&txn, id).await?;
    require_owner(&org, auth_user.user_id)?;

    let match_ids: Vec<i32> = matches::Entity::find()
        .filter(matches::Column::OrganizationId.eq(id))
        .select_only()
        .column(matches::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;
    delete_match_children(&txn, &match_ids).await?;

    matches::Entity::delete_many()
        .filter(matches::Column::OrganizationId.eq(id))
        .exec(&txn)
        .await?;
    facility::Entity::delete_many()
        .filter(facility::Column::OrganizationId.eq(id))
        .exec(&txn)
        .await?;
    organization_member::Entity::delete_many()
        .filter(organization_member::Column::OrganizationId.eq(id))
        .exec(&txn)
        .await?;
    organization::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(organization_id = id, matches = match_ids.len(), "Deleted organization");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete the roster, score, attendance and rating rows of the given matches.
pub(crate) async fn delete_match_children<C: ConnectionTrait>(
    db: &C,
    match_ids: &[i32],
) -> Result<(), DbErr> {
    if match_ids.is_empty() {
        return Ok(());
    }
    match_roster::Entity::delete_many()
        .filter(match_roster::Column::MatchId.is_in(match_ids.iter().copied()))
        .exec(db)
        .await?;
    match_score::Entity::delete_many()
        .filter(match_score::Column::MatchId.is_in(match_ids.iter().copied()))
        .exec(db)
        .await?;
    match_attendance::Entity::delete_many()
        .filter(match_attendance::Column::MatchId.is_in(match_ids.iter().copied()))
        .exec(db)
        .await?;
    match_rating::Entity::delete_many()
        .filter(match_rating::Column::MatchId.is_in(match_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(())
}
