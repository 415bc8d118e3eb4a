use chrono::{DateTime, Utc};
use common::{MemberRole, MemberStatus, Plan};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_name, validate_optional_text};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateOrganizationRequest {
    #[schema(example = "Moda Halısaha Ekibi")]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the owner's plan.
    pub plan: Option<Plan>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

pub fn validate_create_organization(req: &CreateOrganizationRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name", 100)?;
    validate_optional_text(req.description.as_deref(), "Description", 2000)
}

pub fn validate_update_organization(req: &UpdateOrganizationRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name", 100)?;
    }
    if let Some(Some(ref description)) = req.description {
        validate_optional_text(Some(description), "Description", 2000)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct OrganizationResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i32,
    pub plan: Plan,
    pub max_players: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::organization::Model> for OrganizationResponse {
    fn from(m: crate::entity::organization::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            owner_id: m.owner_id,
            plan: m.plan,
            max_players: m.max_players,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// An organization as seen by the caller.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OrganizationListItem {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    /// True when the caller owns the organization.
    pub is_owner: bool,
    /// The caller's role; `None` for the owner.
    pub member_role: Option<MemberRole>,
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateMemberRequest {
    pub status: Option<MemberStatus>,
    pub role: Option<MemberRole>,
}

pub fn validate_update_member(req: &UpdateMemberRequest) -> Result<(), AppError> {
    if *req == UpdateMemberRequest::default() {
        return Err(AppError::Validation(
            "At least one of status or role is required".into(),
        ));
    }
    if req.status == Some(MemberStatus::Pending) {
        return Err(AppError::Validation(
            "A membership cannot be moved back to PENDING".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MemberResponse {
    pub organization_id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub status: MemberStatus,
    pub role: MemberRole,
    pub is_owner: bool,
    /// `None` for an owner without a membership row.
    pub requested_at: Option<DateTime<Utc>>,
}
