use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::plan::{check_member_capacity, check_membership_limit};
use common::{MatchStatus, MemberRole, MemberStatus};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{match_roster, matches, organization, organization_member, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::organization::*;
use crate::state::AppState;
use crate::utils::access::{find_organization, find_organization_for_update, require_member, require_owner};

#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/join",
    tag = "Membership",
    operation_id = "joinOrganization",
    summary = "Request to join an organization",
    description = "Creates a PENDING membership for the caller. The owner decides on it. A player already approved in 2 organizations cannot ask for a third.",
    params(("id" = i32, Path, description = "Organization ID")),
    responses(
        (status = 201, description = "Join request created", body = MemberResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Membership limit reached (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already requested, already a member, or the owner (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn join_organization(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let org = find_organization(&state.db, id).await?;
    if org.owner_id == auth_user.user_id {
        return Err(AppError::Conflict(
            "The owner is already part of the organization".into(),
        ));
    }

    if organization_member::Entity::find_by_id((id, auth_user.user_id))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A membership for this organization already exists".into(),
        ));
    }

    check_membership_limit(approved_membership_count(&state.db, auth_user.user_id).await?)?;

    let caller = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let now = chrono::Utc::now();
    let new_member = organization_member::ActiveModel {
        organization_id: Set(id),
        user_id: Set(caller.id),
        status: Set(MemberStatus::Pending),
        role: Set(MemberRole::Member),
        requested_at: Set(now),
        updated_at: Set(now),
    };

    match new_member.insert(&state.db).await {
        Ok(model) => {
            info!(organization_id = id, user_id = caller.id, "Join requested");
            Ok((
                StatusCode::CREATED,
                Json(member_response(&org, model, caller)),
            ))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("A membership for this organization already exists".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}/members",
    tag = "Membership",
    operation_id = "listMembers",
    summary = "List members",
    description = "The owner sees every membership including pending and rejected ones; approved members see approved memberships only. The owner is always listed first as an approved member.",
    params(("id" = i32, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Members", body = Vec<MemberResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_members(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    let org = find_organization(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;

    let mut select = organization_member::Entity::find()
        .filter(organization_member::Column::OrganizationId.eq(id));
    if !standing.is_owner() {
        select = select.filter(organization_member::Column::Status.eq(MemberStatus::Approved));
    }
    let rows = select
        .order_by_asc(organization_member::Column::RequestedAt)
        .all(&state.db)
        .await?;

    let user_ids: Vec<i32> = rows
        .iter()
        .map(|m| m.user_id)
        .chain(std::iter::once(org.owner_id))
        .collect();
    let mut users: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut items = Vec::with_capacity(rows.len() + 1);
    if let Some(owner) = users.remove(&org.owner_id) {
        items.push(MemberResponse {
            organization_id: org.id,
            user_id: owner.id,
            name: owner.name,
            email: owner.email,
            status: MemberStatus::Approved,
            role: MemberRole::Member,
            is_owner: true,
            requested_at: None,
        });
    }
    for row in rows {
        if let Some(member) = users.remove(&row.user_id) {
            items.push(member_response(&org, row, member));
        }
    }

    Ok(Json(items))
}

#[utoipa::path(
    patch,
    path = "/api/v1/organizations/{id}/members/{user_id}",
    tag = "Membership",
    operation_id = "updateMember",
    summary = "Approve, reject or change the role of a member",
    description = "Owner only. Approving checks the organization's `max_players` and the player's limit of 2 approved organizations; both checks run with the organization and the player locked. Moving an approved member to REJECTED takes them off the rosters of matches that are not finished yet.",
    params(
        ("id" = i32, Path, description = "Organization ID"),
        ("user_id" = i32, Path, description = "Member user ID"),
    ),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Membership updated", body = MemberResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED) or a limit is reached (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 404, description = "Organization or membership not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id))]
pub async fn update_member(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    validate_update_member(&payload)?;

    let txn = state.db.begin().await?;
    let org = find_organization_for_update(&txn, id).await?;
    require_owner(&org, auth_user.user_id)?;

    let member = user::Entity::find_by_id(user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".into()))?;
    let existing = find_membership(&txn, id, user_id).await?;
    let previous = existing.status;

    if payload.status == Some(MemberStatus::Approved) && previous != MemberStatus::Approved {
        let approved_in_org = organization_member::Entity::find()
            .filter(organization_member::Column::OrganizationId.eq(id))
            .filter(organization_member::Column::Status.eq(MemberStatus::Approved))
            .count(&txn)
            .await?;
        check_member_capacity(org.max_players, approved_in_org)?;
        check_membership_limit(approved_membership_count(&txn, user_id).await?)?;
    }

    let mut active: organization_member::ActiveModel = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    if previous == MemberStatus::Approved && model.status != MemberStatus::Approved {
        remove_from_open_rosters(&txn, id, user_id).await?;
    }

    txn.commit().await?;
    info!(
        organization_id = id,
        user_id,
        from = %previous,
        to = %model.status,
        role = %model.role,
        "Membership updated"
    );
    Ok(Json(member_response(&org, model, member)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}/members/{user_id}",
    tag = "Membership",
    operation_id = "removeMember",
    summary = "Remove a member or leave",
    description = "The owner can remove anyone; a member can remove themselves. The player is also taken off the rosters of the organization's matches that are not finished yet.",
    params(
        ("id" = i32, Path, description = "Organization ID"),
        ("user_id" = i32, Path, description = "Member user ID"),
    ),
    responses(
        (status = 204, description = "Membership removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Neither the owner nor the member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization or membership not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id))]
pub async fn remove_member(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let org = find_organization_for_update(&txn, id).await?;
    if org.owner_id != auth_user.user_id && user_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let existing = find_membership(&txn, id, user_id).await?;
    existing.delete(&txn).await?;
    let dropped = remove_from_open_rosters(&txn, id, user_id).await?;

    txn.commit().await?;
    info!(organization_id = id, user_id, rosters = dropped, "Membership removed");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_membership<C: ConnectionTrait>(
    db: &C,
    organization_id: i32,
    user_id: i32,
) -> Result<organization_member::Model, AppError> {
    organization_member::Entity::find_by_id((organization_id, user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".into()))
}

async fn approved_membership_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    organization_member::Entity::find()
        .filter(organization_member::Column::UserId.eq(user_id))
        .filter(organization_member::Column::Status.eq(MemberStatus::Approved))
        .count(db)
        .await
}

/// Drop the player from roster rows of the organization's DRAFT and
/// UPCOMING matches. Returns the number of rows removed.
async fn remove_from_open_rosters<C: ConnectionTrait>(
    db: &C,
    organization_id: i32,
    user_id: i32,
) -> Result<u64, DbErr> {
    let open_matches: Vec<i32> = matches::Entity::find()
        .filter(matches::Column::OrganizationId.eq(organization_id))
        .filter(matches::Column::Status.is_in([MatchStatus::Draft, MatchStatus::Upcoming]))
        .select_only()
        .column(matches::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    if open_matches.is_empty() {
        return Ok(0);
    }
    let result = match_roster::Entity::delete_many()
        .filter(match_roster::Column::MatchId.is_in(open_matches))
        .filter(match_roster::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

fn member_response(
    org: &organization::Model,
    row: organization_member::Model,
    member: user::Model,
) -> MemberResponse {
    MemberResponse {
        organization_id: row.organization_id,
        user_id: row.user_id,
        name: member.name,
        email: member.email,
        status: row.status,
        role: row.role,
        is_owner: org.owner_id == row.user_id,
        requested_at: Some(row.requested_at),
    }
}
