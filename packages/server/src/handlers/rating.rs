use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::rating::{average, check_rating};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{match_rating, match_roster};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::roster::user_names;
use crate::models::rating::*;
use crate::models::shared::normalize_optional;
use crate::state::AppState;
use crate::utils::access::{find_match_with_org, require_member, require_visible};

#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}/ratings",
    tag = "Ratings",
    operation_id = "listRatings",
    summary = "List ratings of a match",
    description = "Returns every rating given in the match and, per rated player, the average (two decimals) and number of ratings, best first.",
    params(("id" = i32, Path, description = "Match ID")),
    responses(
        (status = 200, description = "Ratings", body = MatchRatingsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_ratings(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MatchRatingsResponse>, AppError> {
    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;

    let rows = match_rating::Entity::find()
        .filter(match_rating::Column::MatchId.eq(id))
        .order_by_asc(match_rating::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut by_player: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for row in &rows {
        by_player.entry(row.rated_user_id).or_default().push(row.rating);
    }
    let names = user_names(&state.db, by_player.keys().copied().collect()).await?;

    let mut summary: Vec<PlayerRatingSummary> = by_player
        .into_iter()
        .filter_map(|(user_id, ratings)| {
            Some(PlayerRatingSummary {
                user_id,
                name: names.get(&user_id).cloned().unwrap_or_default(),
                average: average(&ratings)?,
                count: ratings.len(),
            })
        })
        .collect();
    summary.sort_by(|a, b| b.average.total_cmp(&a.average).then(a.user_id.cmp(&b.user_id)));

    Ok(Json(MatchRatingsResponse {
        ratings: rows.into_iter().map(Into::into).collect(),
        summary,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/matches/{id}/ratings",
    tag = "Ratings",
    operation_id = "ratePlayer",
    summary = "Rate a teammate",
    description = "The match must be FINISHED or PUBLISHED. Rater and rated player must both be on the roster, ratings are 1-5, nobody rates themselves and each player can be rated once per rater.",
    params(("id" = i32, Path, description = "Match ID")),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating saved", body = RatingResponse),
        (status = 400, description = "Validation error or match not played yet (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Match not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already rated (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, rated_user_id = payload.rated_user_id))]
pub async fn create_rating(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_rating(&payload)?;

    let (game, org) = find_match_with_org(&state.db, id).await?;
    let standing = require_member(&state.db, &org, auth_user.user_id).await?;
    require_visible(&game, standing)?;
    if !game.status.is_played() {
        return Err(AppError::Validation(
            "Players can be rated once the match is finished".into(),
        ));
    }

    let roster: Vec<i32> = match_roster::Entity::find()
        .filter(match_roster::Column::MatchId.eq(id))
        .select_only()
        .column(match_roster::Column::UserId)
        .into_tuple()
        .all(&state.db)
        .await?;
    check_rating(auth_user.user_id, payload.rated_user_id, payload.rating, &roster)?;

    let rating = match_rating::ActiveModel {
        match_id: Set(id),
        rater_id: Set(auth_user.user_id),
        rated_user_id: Set(payload.rated_user_id),
        rating: Set(payload.rating),
        comment: Set(normalize_optional(payload.comment)),
        created_at: Set(chrono::Utc::now()),
    };

    match rating.insert(&state.db).await {
        Ok(model) => {
            info!(
                match_id = id,
                rater_id = model.rater_id,
                rated_user_id = model.rated_user_id,
                "Player rated"
            );
            Ok((StatusCode::CREATED, Json(RatingResponse::from(model))))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("You have already rated this player for this match".into()),
        ),
        Err(e) => Err(e.into()),
    }
}
