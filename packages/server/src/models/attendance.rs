use chrono::{DateTime, Utc};
use common::AttendanceStatus;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RespondAttendanceRequest {
    /// `ACCEPTED` or `DECLINED`.
    pub status: AttendanceStatus,
}

pub fn validate_respond_attendance(req: &RespondAttendanceRequest) -> Result<(), AppError> {
    if req.status == AttendanceStatus::Pending {
        return Err(AppError::Validation(
            "Status must be ACCEPTED or DECLINED".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttendanceResponse {
    pub match_id: i32,
    pub user_id: i32,
    pub name: String,
    pub status: AttendanceStatus,
    /// `None` while the player has not answered.
    pub responded_at: Option<DateTime<Utc>>,
}
