use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::roster::check_roster_capacity;
use common::{PositionColumns, RuleError};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{match_roster, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::matches::roster_size;
use crate::models::roster::*;
use crate::state::AppState;
use crate::utils::access::{
    find_match, find_match_for_update, find_match_with_org, find_organization, is_approved,
    require_member, require_roster_manager, require_visible,
};

#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}/roster",
    tag = "Roster",
    operation_id = "listRoster",
    summary = "List the roster of a match",
    description = "Visible to the owner and approved members. Each entry carries the structured position and its legacy string form.",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 200, description = "Roster", body = Vec<RosterEntryResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_roster(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<RosterEntryResponse>>, AppError> {
    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;

    let entries = match_roster::Entity::find()
        .filter(match_roster::Column::MatchId.eq(id))
        .order_by_asc(match_roster::Column::AddedAt)
        .all(&state.db)
        .await?;
    let names = user_names(&state.db, entries.iter().map(|e| e.user_id).collect()).await?;

    let items = entries
        .into_iter()
        .map(|entry| {
            let name = names.get(&entry.user_id).cloned().unwrap_or_default();
            RosterEntryResponse::new(entry, name)
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/matches/{id}/roster",
    tag = "Roster",
    operation_id = "addToRoster",
    summary = "Add a player to the roster",
    description = "Owner or captain. The player must be the owner or an approved member of the organization. The capacity check runs with the match row locked. `position` accepts the structured object or a legacy string such as `GK` or `home_45_30`.",
    params(("id" = i32, Path, description = "Match ID")),
    request_body = AddRosterRequest,
    responses(
        (status = 201, description = "Player added", body = RosterEntryResponse),
        (status = 400, description = "Validation error or player not a member (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Neither owner nor captain (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match or user not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Roster full or player already on it (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = payload.user_id))]
pub async fn add_to_roster(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AddRosterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let position = payload
        .position
        .map(PositionInput::into_position)
        .transpose()?;

    let txn = state.db.begin().await?;
    let game = find_match_for_update(&txn, id).await?;
    let org = find_organization(&txn, game.organization_id).await?;
    require_roster_manager(&txn, &org, auth_user.user_id).await?;

    let player = user::Entity::find_by_id(payload.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    if !is_approved(&txn, &org, player.id).await? {
        return Err(AppError::Validation(
            "Only the owner or approved members can be added to the roster".into(),
        ));
    }

    if match_roster::Entity::find_by_id((id, player.id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Player is already on the roster".into()));
    }
    check_roster_capacity(game.capacity, roster_size(&txn, id).await?)?;

    let columns = PositionColumns::from(position);
    let entry = match_roster::ActiveModel {
        match_id: Set(id),
        user_id: Set(player.id),
        slot: Set(columns.slot),
        team: Set(columns.team),
        pos_x: Set(columns.x),
        pos_y: Set(columns.y),
        added_at: Set(chrono::Utc::now()),
    };

    match entry.insert(&txn).await {
        Ok(model) => {
            txn.commit().await?;
            info!(match_id = id, user_id = player.id, "Added player to roster");
            Ok((
                StatusCode::CREATED,
                Json(RosterEntryResponse::new(model, player.name)),
            ))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Player is already on the roster".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/matches/{id}/roster/{user_id}",
    tag = "Roster",
    operation_id = "removeFromRoster",
    summary = "Remove a player from the roster",
    description = "Owner or captain, or the player themselves.",
    params(
        ("id" = i32, Path, description = "Match ID"),
        ("user_id" = i32, Path, description = "Player user ID"),
    ),
    responses(
        (status = 204, description = "Player removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not allowed (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match or roster entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id))]
pub async fn remove_from_roster(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let game = find_match_for_update(&txn, id).await?;
    if user_id != auth_user.user_id {
        let org = find_organization(&txn, game.organization_id).await?;
        require_roster_manager(&txn, &org, auth_user.user_id).await?;
    }

    let result = match_roster::Entity::delete_by_id((id, user_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Player is not on the roster".into()));
    }

    txn.commit().await?;
    info!(match_id = id, user_id, "Removed player from roster");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/matches/{id}/formation",
    tag = "Roster",
    operation_id = "updateFormation",
    summary = "Place players on the pitch",
    description = "Owner or captain. Every listed player must be on the roster. All listed positions are replaced in one transaction; `position: null` clears a placement. Players not listed keep their positions.",
    params(("id" = i32, Path, description = "Match ID")),
    request_body = UpdateFormationRequest,
    responses(
        (status = 200, description = "Updated roster", body = Vec<RosterEntryResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Neither owner nor captain (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_formation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFormationRequest>,
) -> Result<Json<Vec<RosterEntryResponse>>, AppError> {
    let placements = resolve_formation(payload)?;

    let game = find_match(&state.db, id).await?;
    let org = find_organization(&state.db, game.organization_id).await?;
    require_roster_manager(&state.db, &org, auth_user.user_id).await?;

    let txn = state.db.begin().await?;
    find_match_for_update(&txn, id).await?;

    let mut entries: HashMap<i32, match_roster::Model> = match_roster::Entity::find()
        .filter(match_roster::Column::MatchId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|e| (e.user_id, e))
        .collect();
    if let Some((user_id, _)) = placements.iter().find(|(u, _)| !entries.contains_key(u)) {
        return Err(RuleError::NotOnRoster(*user_id).into());
    }

    for (user_id, columns) in &placements {
        let Some(entry) = entries.remove(user_id) else {
            continue;
        };
        let mut active: match_roster::ActiveModel = entry.into();
        active.slot = Set(columns.slot);
        active.team = Set(columns.team);
        active.pos_x = Set(columns.x);
        active.pos_y = Set(columns.y);
        let updated = active.update(&txn).await?;
        entries.insert(updated.user_id, updated);
    }
    txn.commit().await?;

    let mut entries: Vec<match_roster::Model> = entries.into_values().collect();
    entries.sort_by_key(|e| (e.added_at, e.user_id));

    let names = user_names(&state.db, entries.iter().map(|e| e.user_id).collect()).await?;
    info!(match_id = id, placed = placements.len(), "Formation updated");
    Ok(Json(
        entries
            .into_iter()
            .map(|entry| {
                let name = names.get(&entry.user_id).cloned().unwrap_or_default();
                RosterEntryResponse::new(entry, name)
            })
            .collect(),
    ))
}

/// Display names by user ID.
pub(crate) async fn user_names<C: ConnectionTrait>(
    db: &C,
    user_ids: Vec<i32>,
) -> Result<HashMap<i32, String>, DbErr> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Name)
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect())
}
