use chrono::{DateTime, NaiveDate, Utc};
use common::MatchStatus;
use common::roster::{MAX_CAPACITY, MIN_CAPACITY};
use common::schedule::{check_match_date, parse_kickoff};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_name};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMatchRequest {
    #[schema(example = "Perşembe maçı")]
    pub title: String,
    #[schema(value_type = String, format = Date, example = "2026-10-22")]
    pub date: NaiveDate,
    /// Kickoff, `HH:MM`.
    #[schema(example = "21:00")]
    pub time: String,
    /// Free-text venue. Defaults to the facility name when `facility_id` is set.
    pub venue: Option<String>,
    #[schema(example = 14)]
    pub capacity: i32,
    /// `DRAFT` or `UPCOMING` (default).
    pub status: Option<MatchStatus>,
    pub facility_id: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateMatchRequest {
    pub title: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub capacity: Option<i32>,
    /// Only `DRAFT` and `UPCOMING` can be set here; scores and publishing
    /// move a match further.
    pub status: Option<MatchStatus>,
    /// `null` detaches the facility.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub facility_id: Option<Option<i32>>,
}

fn validate_capacity(capacity: i32) -> Result<(), AppError> {
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
        return Err(AppError::Validation(format!(
            "Capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}"
        )));
    }
    Ok(())
}

fn validate_settable_status(status: Option<MatchStatus>) -> Result<(), AppError> {
    match status {
        None | Some(MatchStatus::Draft) | Some(MatchStatus::Upcoming) => Ok(()),
        Some(other) => Err(AppError::Validation(format!(
            "Status cannot be set to {other} directly"
        ))),
    }
}

pub fn validate_create_match(req: &CreateMatchRequest) -> Result<(), AppError> {
    validate_name(&req.title, "Title", 100)?;
    check_match_date(req.date)?;
    parse_kickoff(&req.time)?;
    validate_capacity(req.capacity)?;
    validate_settable_status(req.status)?;
    match req.venue.as_deref().map(str::trim) {
        Some(venue) if !venue.is_empty() => validate_name(venue, "Venue", 200),
        _ if req.facility_id.is_some() => Ok(()),
        _ => Err(AppError::Validation(
            "Either venue or facility_id is required".into(),
        )),
    }
}

pub fn validate_update_match(req: &UpdateMatchRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_name(title, "Title", 100)?;
    }
    if let Some(date) = req.date {
        check_match_date(date)?;
    }
    if let Some(ref time) = req.time {
        parse_kickoff(time)?;
    }
    if let Some(ref venue) = req.venue {
        validate_name(venue, "Venue", 200)?;
    }
    if let Some(capacity) = req.capacity {
        validate_capacity(capacity)?;
    }
    validate_settable_status(req.status)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MatchResponse {
    pub id: i32,
    pub organization_id: i32,
    pub title: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub capacity: i32,
    pub status: MatchStatus,
    pub facility_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::matches::Model> for MatchResponse {
    fn from(m: crate::entity::matches::Model) -> Self {
        Self {
            id: m.id,
            organization_id: m.organization_id,
            title: m.title,
            date: m.date,
            time: m.time,
            venue: m.venue,
            capacity: m.capacity,
            status: m.status,
            facility_id: m.facility_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A match with the number of rostered players.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MatchListItem {
    #[serde(flatten)]
    pub game: MatchResponse,
    pub roster_size: u64,
}
