use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use common::AttendanceStatus;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{match_attendance, match_roster, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::roster::user_names;
use crate::models::attendance::*;
use crate::state::AppState;
use crate::utils::access::{find_match_with_org, require_member, require_visible};

#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}/attendance",
    tag = "Attendance",
    operation_id = "listAttendance",
    summary = "List attendance answers",
    description = "One entry per rostered player plus anyone else who answered. Rostered players who have not answered are reported as PENDING.",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 200, description = "Attendance", body = Vec<AttendanceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<AttendanceResponse>>, AppError> {
    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;

    let roster: Vec<i32> = match_roster::Entity::find()
        .filter(match_roster::Column::MatchId.eq(id))
        .order_by_asc(match_roster::Column::AddedAt)
        .select_only()
        .column(match_roster::Column::UserId)
        .into_tuple()
        .all(&state.db)
        .await?;
    let mut answers: HashMap<i32, match_attendance::Model> = match_attendance::Entity::find()
        .filter(match_attendance::Column::MatchId.eq(id))
        .order_by_asc(match_attendance::Column::RespondedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.user_id, a))
        .collect();

    let mut order = roster.clone();
    let mut extra: Vec<&match_attendance::Model> = answers
        .values()
        .filter(|a| !roster.contains(&a.user_id))
        .collect();
    extra.sort_by_key(|a| (a.responded_at, a.user_id));
    order.extend(extra.into_iter().map(|a| a.user_id));

    let names = user_names(&state.db, order.clone()).await?;
    let items = order
        .into_iter()
        .map(|user_id| {
            let name = names.get(&user_id).cloned().unwrap_or_default();
            match answers.remove(&user_id) {
                Some(answer) => AttendanceResponse {
                    match_id: id,
                    user_id,
                    name,
                    status: answer.status,
                    responded_at: Some(answer.responded_at),
                },
                None => AttendanceResponse {
                    match_id: id,
                    user_id,
                    name,
                    status: AttendanceStatus::Pending,
                    responded_at: None,
                },
            }
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    put,
    path = "/api/v1/matches/{id}/attendance",
    tag = "Attendance",
    operation_id = "respondAttendance",
    summary = "Answer for yourself",
    description = "The caller says whether they will come. Open to the owner and approved members; answering again overwrites the previous answer.",
    params(("id" = i32, Path, description = "Match ID")),
    request_body = RespondAttendanceRequest,
    responses(
        (status = 200, description = "Answer saved", body = AttendanceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn respond_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RespondAttendanceRequest>,
) -> Result<Json<AttendanceResponse>, AppError> {
    validate_respond_attendance(&payload)?;

    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;

    let caller = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let now = chrono::Utc::now();
    let answer = match_attendance::ActiveModel {
        match_id: Set(id),
        user_id: Set(caller.id),
        status: Set(payload.status),
        responded_at: Set(now),
    };
    match_attendance::Entity::insert(answer)
        .on_conflict(
            OnConflict::columns([
                match_attendance::Column::MatchId,
                match_attendance::Column::UserId,
            ])
            .update_columns([
                match_attendance::Column::Status,
                match_attendance::Column::RespondedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await?;

    info!(match_id = id, user_id = caller.id, status = %payload.status, "Attendance answered");
    Ok(Json(AttendanceResponse {
        match_id: id,
        user_id: caller.id,
        name: caller.name,
        status: payload.status,
        responded_at: Some(now),
    }))
}
