use common::AttendanceStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "match_attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub match_id: i32,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "match_id", to = "id")]
    pub game: Option<super::matches::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,

    pub status: AttendanceStatus,
    pub responded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
