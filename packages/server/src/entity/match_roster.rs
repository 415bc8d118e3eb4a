use common::{NamedSlot, PositionColumns, Team};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A player assigned to a match, with an optional formation position.
///
/// The position lives in four nullable columns: either `slot`, or
/// `team` + `pos_x` + `pos_y` (percentages). See [`common::Position`].
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "match_roster")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub match_id: i32,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "match_id", to = "id")]
    pub game: Option<super::matches::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,

    pub slot: Option<NamedSlot>,
    pub team: Option<Team>,
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,

    pub added_at: DateTimeUtc,
}

impl Model {
    pub fn position_columns(&self) -> PositionColumns {
        PositionColumns {
            slot: self.slot,
            team: self.team,
            x: self.pos_x,
            y: self.pos_y,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
