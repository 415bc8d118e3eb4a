use common::MatchStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub organization_id: i32,
    #[sea_orm(belongs_to, from = "organization_id", to = "id")]
    pub organization: HasOne<super::organization::Entity>,

    pub title: String,
    /// Calendar date of the match; weekly quotas are counted on this.
    pub date: Date,
    /// Kickoff in `HH:MM`.
    pub time: String,
    pub venue: String,
    pub capacity: i32,
    pub status: MatchStatus,

    /// NULL when the venue is free text only.
    pub facility_id: Option<i32>,
    #[sea_orm(belongs_to, from = "facility_id", to = "id")]
    pub facility: Option<super::facility::Entity>,

    #[sea_orm(has_many)]
    pub roster: HasMany<super::match_roster::Entity>,

    #[sea_orm(has_one)]
    pub score: HasOne<super::match_score::Entity>,

    #[sea_orm(has_many)]
    pub attendance: HasMany<super::match_attendance::Entity>,

    #[sea_orm(has_many)]
    pub ratings: HasMany<super::match_rating::Entity>,

    pub created_by: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
