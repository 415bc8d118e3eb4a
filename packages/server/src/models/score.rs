use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::match_score::GoalScorer;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertScoreRequest {
    #[schema(example = 5)]
    pub home_score: i32,
    #[schema(example = 3)]
    pub away_score: i32,
    #[serde(default)]
    pub home_scorers: Vec<GoalScorer>,
    #[serde(default)]
    pub away_scorers: Vec<GoalScorer>,
}

fn validate_side(side: &str, score: i32, scorers: &[GoalScorer]) -> Result<(), AppError> {
    if score < 0 {
        return Err(AppError::Validation(format!("{side} score must be >= 0")));
    }
    let mut goals = 0i64;
    for scorer in scorers {
        if scorer.name.trim().is_empty() || scorer.name.chars().count() > 64 {
            return Err(AppError::Validation(
                "Scorer name must be 1-64 characters".into(),
            ));
        }
        if scorer.goals < 1 {
            return Err(AppError::Validation("Scorer goals must be >= 1".into()));
        }
        goals += i64::from(scorer.goals);
    }
    if goals > i64::from(score) {
        return Err(AppError::Validation(format!(
            "{side} scorers account for {goals} goals but the score is {score}"
        )));
    }
    Ok(())
}

pub fn validate_upsert_score(req: &UpsertScoreRequest) -> Result<(), AppError> {
    validate_side("Home", req.home_score, &req.home_scorers)?;
    validate_side("Away", req.away_score, &req.away_scorers)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub match_id: i32,
    pub home_score: i32,
    pub away_score: i32,
    pub home_scorers: Vec<GoalScorer>,
    pub away_scorers: Vec<GoalScorer>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<crate::entity::match_score::Model> for ScoreResponse {
    type Error = AppError;

    fn try_from(m: crate::entity::match_score::Model) -> Result<Self, Self::Error> {
        let decode = |value: serde_json::Value| {
            serde_json::from_value::<Vec<GoalScorer>>(value)
                .map_err(|e| AppError::Internal(format!("Corrupt scorer list: {e}")))
        };
        Ok(Self {
            match_id: m.match_id,
            home_score: m.home_score,
            away_score: m.away_score,
            home_scorers: decode(m.home_scorers)?,
            away_scorers: decode(m.away_scorers)?,
            updated_at: m.updated_at,
        })
    }
}
