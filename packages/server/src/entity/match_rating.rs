use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "match_rating")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub match_id: i32,
    #[sea_orm(primary_key)]
    pub rater_id: i32,
    #[sea_orm(primary_key)]
    pub rated_user_id: i32,
    #[sea_orm(belongs_to, from = "match_id", to = "id")]
    pub game: Option<super::matches::Entity>,

    /// 1-5.
    pub rating: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
