use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::{Position, PositionColumns, RuleError};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A position as sent by clients: the structured object, or the legacy
/// single string (`"GK"`, `"home_45_30"`).
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum PositionInput {
    Structured(Position),
    Legacy(String),
}

impl PositionInput {
    pub fn into_position(self) -> Result<Position, RuleError> {
        match self {
            PositionInput::Structured(position) => {
                position.validate()?;
                Ok(position)
            }
            PositionInput::Legacy(raw) => Position::parse_legacy(&raw),
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddRosterRequest {
    pub user_id: i32,
    pub position: Option<PositionInput>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct PlacementRequest {
    pub user_id: i32,
    /// `null` takes the player off the pitch diagram.
    pub position: Option<PositionInput>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateFormationRequest {
    pub placements: Vec<PlacementRequest>,
}

/// Validate a formation update and resolve every position.
pub fn resolve_formation(
    req: UpdateFormationRequest,
) -> Result<Vec<(i32, PositionColumns)>, AppError> {
    if req.placements.is_empty() {
        return Err(AppError::Validation("placements must not be empty".into()));
    }
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(req.placements.len());
    for placement in req.placements {
        if !seen.insert(placement.user_id) {
            return Err(AppError::Validation(format!(
                "Duplicate user_id {} in placements",
                placement.user_id
            )));
        }
        let position = placement
            .position
            .map(PositionInput::into_position)
            .transpose()?;
        resolved.push((placement.user_id, PositionColumns::from(position)));
    }
    Ok(resolved)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RosterEntryResponse {
    pub match_id: i32,
    pub user_id: i32,
    pub name: String,
    pub position: Option<Position>,
    /// The same position in the single-string form older clients read.
    #[schema(example = "home_45_30")]
    pub legacy_position: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl RosterEntryResponse {
    pub fn new(entry: crate::entity::match_roster::Model, name: String) -> Self {
        let position = entry.position_columns().to_position();
        Self {
            match_id: entry.match_id,
            user_id: entry.user_id,
            name,
            legacy_position: position.as_ref().map(Position::to_legacy),
            position,
            added_at: entry.added_at,
        }
    }
}
