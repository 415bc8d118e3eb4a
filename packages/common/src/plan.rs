#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RuleError;

/// Player limit of a FREE organization.
pub const FREE_MAX_PLAYERS: i32 = 10;

/// Player limit of a PREMIUM organization. Large enough to never bind in practice.
pub const PREMIUM_MAX_PLAYERS: i32 = 9999;

/// A player may be an approved member of this many organizations at once.
pub const MAX_APPROVED_MEMBERSHIPS: u64 = 2;

/// Billing plan. Attached to admin accounts and copied onto the
/// organizations they own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "FREE"))]
    Free,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PREMIUM"))]
    Premium,
}

impl Plan {
    pub const ALL: &'static [Plan] = &[Self::Free, Self::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Premium => "PREMIUM",
        }
    }

    /// Value stored in `organization.max_players` when an organization is
    /// created on (or moved to) this plan.
    pub fn max_players(&self) -> i32 {
        match self {
            Self::Free => FREE_MAX_PLAYERS,
            Self::Premium => PREMIUM_MAX_PLAYERS,
        }
    }

    /// Matches allowed per Sunday-to-Sunday week, `None` when unlimited.
    pub fn max_matches_per_week(&self) -> Option<u64> {
        match self {
            Self::Free => Some(1),
            Self::Premium => None,
        }
    }

    /// Whether an account on `self` may open an organization on `requested`.
    pub fn allows(&self, requested: Plan) -> bool {
        matches!(
            (self, requested),
            (_, Plan::Free) | (Plan::Premium, Plan::Premium)
        )
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that one more member can be approved.
///
/// `approved_count` is the number of approved membership rows; the owner is
/// not counted.
pub fn check_member_capacity(max_players: i32, approved_count: u64) -> Result<(), RuleError> {
    if approved_count >= u64::try_from(max_players).unwrap_or(0) {
        return Err(RuleError::MemberCapacityReached { max_players });
    }
    Ok(())
}

/// Check that one more match may be scheduled in a week that already holds
/// `matches_in_week` matches of the same organization.
pub fn check_weekly_match_quota(plan: Plan, matches_in_week: u64) -> Result<(), RuleError> {
    match plan.max_matches_per_week() {
        Some(limit) if matches_in_week >= limit => Err(RuleError::WeeklyMatchLimit {
            plan: plan.as_str(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// Check that a player holding `approved_memberships` approved memberships
/// may be approved into one more organization.
pub fn check_membership_limit(approved_memberships: u64) -> Result<(), RuleError> {
    if approved_memberships >= MAX_APPROVED_MEMBERSHIPS {
        return Err(RuleError::MembershipLimit {
            limit: MAX_APPROVED_MEMBERSHIPS,
        });
    }
    Ok(())
}
