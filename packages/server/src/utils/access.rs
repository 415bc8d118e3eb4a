//! Ownership and membership checks shared by the handlers.

use common::{MemberRole, MemberStatus};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
};

use crate::entity::{matches, organization, organization_member};
use crate::error::AppError;

/// How the caller relates to an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Standing {
    Owner,
    Member(MemberRole),
}

impl Standing {
    pub fn is_owner(&self) -> bool {
        matches!(self, Standing::Owner)
    }

    /// Owners and captains run the roster, formation and attendance.
    pub fn can_manage_roster(&self) -> bool {
        matches!(self, Standing::Owner | Standing::Member(MemberRole::Captain))
    }
}

/// Look up an organization by ID, returning 404 if not found.
pub async fn find_organization<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<organization::Model, AppError> {
    organization::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))
}

/// Same as [`find_organization`] but takes a row lock for the rest of the transaction.
pub async fn find_organization_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<organization::Model, AppError> {
    organization::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))
}

/// Resolve the caller's standing. `None` unless they own the organization or
/// hold an approved membership.
pub async fn standing<C: ConnectionTrait>(
    db: &C,
    org: &organization::Model,
    user_id: i32,
) -> Result<Option<Standing>, AppError> {
    if org.owner_id == user_id {
        return Ok(Some(Standing::Owner));
    }
    let membership = organization_member::Entity::find_by_id((org.id, user_id))
        .one(db)
        .await?;
    Ok(membership
        .filter(|m| m.status == MemberStatus::Approved)
        .map(|m| Standing::Member(m.role)))
}

/// Require that the caller is the owner or an approved member.
pub async fn require_member<C: ConnectionTrait>(
    db: &C,
    org: &organization::Model,
    user_id: i32,
) -> Result<Standing, AppError> {
    standing(db, org, user_id)
        .await?
        .ok_or(AppError::PermissionDenied)
}

/// Require that the caller owns the organization.
pub fn require_owner(org: &organization::Model, user_id: i32) -> Result<(), AppError> {
    if org.owner_id == user_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Require that the caller may manage the roster of the organization's matches.
pub async fn require_roster_manager<C: ConnectionTrait>(
    db: &C,
    org: &organization::Model,
    user_id: i32,
) -> Result<Standing, AppError> {
    let standing = require_member(db, org, user_id).await?;
    if standing.can_manage_roster() {
        Ok(standing)
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Whether `user_id` is the owner or an approved member of `org`.
pub async fn is_approved<C: ConnectionTrait>(
    db: &C,
    org: &organization::Model,
    user_id: i32,
) -> Result<bool, AppError> {
    Ok(standing(db, org, user_id).await?.is_some())
}

/// IDs of approved members, owner included.
pub async fn approved_member_ids<C: ConnectionTrait>(
    db: &C,
    org: &organization::Model,
) -> Result<Vec<i32>, AppError> {
    let mut ids: Vec<i32> = organization_member::Entity::find()
        .filter(organization_member::Column::OrganizationId.eq(org.id))
        .filter(organization_member::Column::Status.eq(MemberStatus::Approved))
        .select_only()
        .column(organization_member::Column::UserId)
        .into_tuple()
        .all(db)
        .await?;
    if !ids.contains(&org.owner_id) {
        ids.push(org.owner_id);
    }
    Ok(ids)
}

/// Look up a match by ID, returning 404 if not found.
pub async fn find_match<C: ConnectionTrait>(db: &C, id: i32) -> Result<matches::Model, AppError> {
    matches::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".into()))
}

/// Same as [`find_match`] but takes a row lock for the rest of the transaction.
pub async fn find_match_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<matches::Model, AppError> {
    matches::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".into()))
}

/// Load a match together with its organization.
pub async fn find_match_with_org<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<(matches::Model, organization::Model), AppError> {
    let game = find_match(db, id).await?;
    let org = find_organization(db, game.organization_id).await?;
    Ok((game, org))
}

/// Members see a match once it leaves DRAFT; owners always see it.
pub fn require_visible(game: &matches::Model, standing: Standing) -> Result<(), AppError> {
    if game.status == common::MatchStatus::Draft && !standing.is_owner() {
        return Err(AppError::NotFound("Match not found".into()));
    }
    Ok(())
}
