use common::Plan;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// The owner is always treated as an approved member, with or without a
    /// membership row.
    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    pub plan: Plan,
    /// Fixed from `plan` at creation and on upgrade.
    pub max_players: i32,

    #[sea_orm(has_many)]
    pub members: HasMany<super::organization_member::Entity>,

    #[sea_orm(has_many)]
    pub matches: HasMany<super::matches::Entity>,

    #[sea_orm(has_many)]
    pub facilities: HasMany<super::facility::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
