use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::error::AppError;

const MAX_LOCATION_CHARS: usize = 4096;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateFacilityRequest {
    #[schema(example = "Moda Spor Tesisleri")]
    pub name: String,
    /// Maps share URL, iframe embed snippet, coordinates or address.
    #[schema(example = "https://www.google.com/maps/place/Moda/@40.98,29.02,17z")]
    pub location: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateFacilityRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

fn validate_location(location: &str) -> Result<(), AppError> {
    if location.chars().count() > MAX_LOCATION_CHARS {
        return Err(AppError::Validation(format!(
            "Location must be at most {MAX_LOCATION_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_create_facility(req: &CreateFacilityRequest) -> Result<(), AppError> {
    validate_name(&req.name, "Name", 100)?;
    validate_location(&req.location)
}

pub fn validate_update_facility(req: &UpdateFacilityRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name, "Name", 100)?;
    }
    if let Some(ref location) = req.location {
        validate_location(location)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FacilityResponse {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub location: String,
    /// Embeddable maps URL derived from `location`, if one can be derived.
    pub embed_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::facility::Model> for FacilityResponse {
    fn from(m: crate::entity::facility::Model) -> Self {
        Self {
            embed_url: common::location::embed_url(&m.location),
            id: m.id,
            organization_id: m.organization_id,
            name: m.name,
            location: m.location,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
