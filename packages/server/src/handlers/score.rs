use axum::Json;
use axum::extract::{Path, State};
use common::MatchStatus;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{match_score, matches};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::matches::MatchResponse;
use crate::models::score::*;
use crate::state::AppState;
use crate::utils::access::{
    find_match_for_update, find_match_with_org, find_organization, require_member, require_owner,
    require_visible,
};

#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}/score",
    tag = "Score",
    operation_id = "getScore",
    summary = "Get the score of a match",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 200, description = "Score", body = ScoreResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found or no score recorded (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ScoreResponse>, AppError> {
    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;

    let score = match_score::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No score recorded for this match".into()))?;
    Ok(Json(score.try_into()?))
}

#[utoipa::path(
    put,
    path = "/api/v1/matches/{id}/score",
    tag = "Score",
    operation_id = "upsertScore",
    summary = "Record or correct the score",
    description = "Owner only. Scores are non-negative; each scorer has at least one goal and the scorers of a side cannot account for more goals than the side scored. Recording a score moves a DRAFT or UPCOMING match to FINISHED.",
    params(("id" = i32, Path, description = "Match ID")),
    request_body = UpsertScoreRequest,
    responses(
        (status = 200, description = "Score saved", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn upsert_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpsertScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    validate_upsert_score(&payload)?;

    let txn = state.db.begin().await?;
    let game = find_match_for_update(&txn, id).await?;
    let org = find_organization(&txn, game.organization_id).await?;
    require_owner(&org, auth_user.user_id)?;

    let encode = |scorers: &[crate::entity::match_score::GoalScorer]| {
        serde_json::to_value(scorers)
            .map_err(|e| AppError::Internal(format!("Scorer encode error: {e}")))
    };
    let home_scorers = encode(&payload.home_scorers)?;
    let away_scorers = encode(&payload.away_scorers)?;
    let now = chrono::Utc::now();

    let score = match match_score::Entity::find_by_id(id).one(&txn).await? {
        Some(existing) => {
            let mut active: match_score::ActiveModel = existing.into();
            active.home_score = Set(payload.home_score);
            active.away_score = Set(payload.away_score);
            active.home_scorers = Set(home_scorers);
            active.away_scorers = Set(away_scorers);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            match_score::ActiveModel {
                match_id: Set(id),
                home_score: Set(payload.home_score),
                away_score: Set(payload.away_score),
                home_scorers: Set(home_scorers),
                away_scorers: Set(away_scorers),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?
        }
    };

    if !game.status.is_played() {
        let mut active: matches::ActiveModel = game.into();
        active.status = Set(MatchStatus::Finished);
        active.updated_at = Set(now);
        active.update(&txn).await?;
    }

    txn.commit().await?;
    info!(
        match_id = id,
        home = score.home_score,
        away = score.away_score,
        "Score recorded"
    );
    Ok(Json(score.try_into()?))
}

#[utoipa::path(
    post,
    path = "/api/v1/matches/{id}/publish",
    tag = "Score",
    operation_id = "publishMatch",
    summary = "Publish a finished match",
    description = "Owner only. Requires a recorded score. Sets the match to PUBLISHED.",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 200, description = "Match published", body = MatchResponse),
        (status = 400, description = "No score recorded (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn publish_match(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MatchResponse>, AppError> {
    let txn = state.db.begin().await?;
    let game = find_match_for_update(&txn, id).await?;
    let org = find_organization(&txn, game.organization_id).await?;
    require_owner(&org, auth_user.user_id)?;

    if match_score::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::Validation(
            "A score must be recorded before publishing".into(),
        ));
    }

    let model = if game.status == MatchStatus::Published {
        game
    } else {
        let mut active: matches::ActiveModel = game.into();
        active.status = Set(MatchStatus::Published);
        active.updated_at = Set(chrono::Utc::now());
        active.update(&txn).await?
    };

    txn.commit().await?;
    info!(match_id = id, "Match published");
    Ok(Json(model.into()))
}
