use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use common::plan::check_weekly_match_quota;
use common::roster::check_capacity_change;
use common::schedule::week_bounds;
use common::MatchStatus;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::Func;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{facility, match_roster, matches};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::organization::delete_match_children;
use crate::models::matches::*;
use crate::state::AppState;
use crate::utils::access::{
    find_match, find_match_for_update, find_match_with_org, find_organization,
    find_organization_for_update, require_member, require_owner, require_visible,
};

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}/matches",
    tag = "Matches",
    operation_id = "listMatches",
    summary = "List the matches of an organization",
    description = "Ordered by date and kickoff. The owner sees every match; members do not see DRAFT matches.",
    params(("id" = i32, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Matches", body = Vec<MatchListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organization not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_matches(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MatchListItem>>, AppError> {
    let org = find_organization(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;

    let mut select = matches::Entity::find().filter(matches::Column::OrganizationId.eq(id));
    if !standing.is_owner() {
        select = select.filter(matches::Column::Status.ne(MatchStatus::Draft));
    }
    let games = select
        .order_by_asc(matches::Column::Date)
        .order_by_asc(matches::Column::Time)
        .order_by_asc(matches::Column::Id)
        .all(&state.db)
        .await?;

    let sizes = roster_sizes(&state.db, games.iter().map(|g| g.id).collect()).await?;
    let items = games
        .into_iter()
        .map(|game| MatchListItem {
            roster_size: sizes.get(&game.id).copied().unwrap_or(0),
            game: game.into(),
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/matches",
    tag = "Matches",
    operation_id = "createMatch",
    summary = "Schedule a match",
    description = "Owner only. FREE organizations may hold one match per Sunday-to-Sunday week; the check runs with the organization row locked. `capacity` is 2-50 and `time` is `HH:MM`. When `facility_id` is given without `venue`, the facility name becomes the venue.",
    params(("id" = i32, Path, description = "Organization ID")),
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Match created", body = MatchResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED) or weekly quota used (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 404, description = "Organization or facility not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, date = %payload.date))]
pub async fn create_match(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateMatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_match(&payload)?;

    let txn = state.db.begin().await?;
    let org = find_organization_for_update(&txn, id).await?;
    require_owner(&org, auth_user.user_id)?;

    let facility_name = match payload.facility_id {
        Some(facility_id) => Some(find_org_facility(&txn, id, facility_id).await?.name),
        None => None,
    };
    let venue = payload
        .venue
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or(facility_name)
        .ok_or_else(|| AppError::Validation("Either venue or facility_id is required".into()))?;

    check_weekly_match_quota(org.plan, matches_in_week(&txn, id, payload.date, None).await?)?;

    let now = chrono::Utc::now();
    let model = matches::ActiveModel {
        organization_id: Set(id),
        title: Set(payload.title.trim().to_string()),
        date: Set(payload.date),
        time: Set(payload.time.trim().to_string()),
        venue: Set(venue),
        capacity: Set(payload.capacity),
        status: Set(payload.status.unwrap_or_default()),
        facility_id: Set(payload.facility_id),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(organization_id = id, match_id = model.id, "Created match");
    Ok((StatusCode::CREATED, Json(MatchResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    operation_id = "getMatch",
    summary = "Get a match",
    description = "Visible to the owner and approved members; DRAFT matches are visible to the owner only.",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 200, description = "Match", body = MatchListItem),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_match(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MatchListItem>, AppError> {
    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;

    let roster_size = roster_size(&state.db, id).await?;
    Ok(Json(MatchListItem {
        game: game.into(),
        roster_size,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    operation_id = "updateMatch",
    summary = "Update a match",
    description = "Owner only. `capacity` cannot drop below the current roster size. FINISHED and PUBLISHED matches keep their status. Moving the match to another date re-checks the weekly quota of FREE organizations. `facility_id: null` detaches the facility.",
    params(("id" = i32, Path, description = "Match ID")),
    request_body = UpdateMatchRequest,
    responses(
        (status = 200, description = "Match updated", body = MatchResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED) or weekly quota used (PLAN_LIMIT_REACHED)", body = ErrorBody),
        (status = 404, description = "Match or facility not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Capacity below roster size or match already played (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_match(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateMatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    validate_update_match(&payload)?;

    let organization_id = find_match(&state.db, id).await?.organization_id;

    // Organization first, then match: the same order as match creation.
    let txn = state.db.begin().await?;
    let org = find_organization_for_update(&txn, organization_id).await?;
    require_owner(&org, auth_user.user_id)?;
    let existing = find_match_for_update(&txn, id).await?;

    if payload == UpdateMatchRequest::default() {
        return Ok(Json(existing.into()));
    }

    if payload.status.is_some_and(|status| status != existing.status)
        && existing.status.is_played()
    {
        return Err(AppError::Conflict(format!(
            "Match is already {}; its status can no longer be changed",
            existing.status
        )));
    }
    if let Some(capacity) = payload.capacity {
        check_capacity_change(capacity, roster_size(&txn, id).await?)?;
    }
    if let Some(date) = payload.date
        && date != existing.date
    {
        check_weekly_match_quota(
            org.plan,
            matches_in_week(&txn, organization_id, date, Some(id)).await?,
        )?;
    }
    if let Some(Some(facility_id)) = payload.facility_id {
        find_org_facility(&txn, organization_id, facility_id).await?;
    }

    let mut active: matches::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(date) = payload.date {
        active.date = Set(date);
    }
    if let Some(ref time) = payload.time {
        active.time = Set(time.trim().to_string());
    }
    if let Some(ref venue) = payload.venue {
        active.venue = Set(venue.trim().to_string());
    }
    if let Some(capacity) = payload.capacity {
        active.capacity = Set(capacity);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(facility_id) = payload.facility_id {
        active.facility_id = Set(facility_id);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    operation_id = "deleteMatch",
    summary = "Delete a match",
    description = "Owner only. Deletes the match with its roster, score, attendance and ratings.",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 204, description = "Match deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_match(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let game = find_match_for_update(&txn, id).await?;
    let org = find_organization(&txn, game.organization_id).await?;
    require_owner(&org, auth_user.user_id)?;

    delete_match_children(&txn, &[id]).await?;
    matches::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(match_id = id, "Deleted match");
    Ok(StatusCode::NO_CONTENT)
}

/// Matches of the organization in the Sunday-to-Sunday week holding `date`,
/// optionally leaving one match out.
async fn matches_in_week<C: ConnectionTrait>(
    db: &C,
    organization_id: i32,
    date: NaiveDate,
    exclude: Option<i32>,
) -> Result<u64, AppError> {
    let (start, end) = week_bounds(date)?;
    let mut select = matches::Entity::find()
        .filter(matches::Column::OrganizationId.eq(organization_id))
        .filter(matches::Column::Date.gte(start))
        .filter(matches::Column::Date.lt(end));
    if let Some(id) = exclude {
        select = select.filter(matches::Column::Id.ne(id));
    }
    Ok(select.count(db).await?)
}

async fn find_org_facility<C: ConnectionTrait>(
    db: &C,
    organization_id: i32,
    facility_id: i32,
) -> Result<facility::Model, AppError> {
    facility::Entity::find_by_id(facility_id)
        .filter(facility::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Facility not found".into()))
}

pub(crate) async fn roster_size<C: ConnectionTrait>(db: &C, match_id: i32) -> Result<u64, DbErr> {
    match_roster::Entity::find()
        .filter(match_roster::Column::MatchId.eq(match_id))
        .count(db)
        .await
}

async fn roster_sizes<C: ConnectionTrait>(
    db: &C,
    match_ids: Vec<i32>,
) -> Result<HashMap<i32, u64>, DbErr> {
    if match_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = match_roster::Entity::find()
        .select_only()
        .column(match_roster::Column::MatchId)
        .column_as(Expr::from(Func::count(Expr::col(match_roster::Column::UserId))), "size")
        .filter(match_roster::Column::MatchId.is_in(match_ids))
        .group_by(match_roster::Column::MatchId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, size)| (id, u64::try_from(size).unwrap_or(0)))
        .collect())
}
