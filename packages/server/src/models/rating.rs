use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_optional_text;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRatingRequest {
    pub rated_user_id: i32,
    /// 1-5.
    #[schema(example = 4)]
    pub rating: i32,
    pub comment: Option<String>,
}

pub fn validate_create_rating(req: &CreateRatingRequest) -> Result<(), AppError> {
    validate_optional_text(req.comment.as_deref(), "Comment", 500)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RatingResponse {
    pub match_id: i32,
    pub rater_id: i32,
    pub rated_user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::match_rating::Model> for RatingResponse {
    fn from(m: crate::entity::match_rating::Model) -> Self {
        Self {
            match_id: m.match_id,
            rater_id: m.rater_id,
            rated_user_id: m.rated_user_id,
            rating: m.rating,
            comment: m.comment,
            created_at: m.created_at,
        }
    }
}

/// Average rating of one player in one match.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PlayerRatingSummary {
    pub user_id: i32,
    pub name: String,
    #[schema(example = 4.33)]
    pub average: f64,
    pub count: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MatchRatingsResponse {
    pub ratings: Vec<RatingResponse>,
    /// Highest average first.
    pub summary: Vec<PlayerRatingSummary>,
}
