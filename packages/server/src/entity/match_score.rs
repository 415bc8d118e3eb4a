use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A goal-scorer record. Stored as JSON arrays on [`Model`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GoalScorer {
    /// Set when the scorer is a registered user.
    #[schema(example = 7)]
    pub user_id: Option<i32>,
    #[schema(example = "Emre")]
    pub name: String,
    #[schema(example = 2)]
    pub goals: i32,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "match_score")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub match_id: i32,
    #[sea_orm(belongs_to, from = "match_id", to = "id")]
    pub game: HasOne<super::matches::Entity>,

    pub home_score: i32,
    pub away_score: i32,

    /// JSON array of [`GoalScorer`].
    #[sea_orm(column_type = "JsonBinary")]
    pub home_scorers: serde_json::Value,
    /// JSON array of [`GoalScorer`].
    #[sea_orm(column_type = "JsonBinary")]
    pub away_scorers: serde_json::Value,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
