use common::{Plan, Role};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored lower-cased.
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password: String,

    pub role: Role,
    pub plan: Plan,

    #[sea_orm(has_many)]
    pub organizations: HasMany<super::organization::Entity>,

    #[sea_orm(has_many)]
    pub memberships: HasMany<super::organization_member::Entity>,

    #[sea_orm(has_many)]
    pub payments: HasMany<super::payment::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
