use thiserror::Error;

/// A business rule that a request would break.
///
/// These are produced by the pure checks in this crate; the server decides
/// which HTTP status each one maps to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Organization has reached its player limit of {max_players}")]
    MemberCapacityReached { max_players: i32 },

    #[error("The {plan} plan allows {limit} match(es) per week")]
    WeeklyMatchLimit { plan: &'static str, limit: u64 },

    #[error("A player can be an approved member of at most {limit} organizations")]
    MembershipLimit { limit: u64 },

    #[error("Match roster is full (capacity {capacity})")]
    RosterFull { capacity: i32 },

    #[error("Capacity cannot be lower than the current roster size ({roster_size})")]
    CapacityBelowRoster { roster_size: u64 },

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid kickoff time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Match date {0} is out of range")]
    DateOutOfRange(chrono::NaiveDate),

    #[error("Rating must be between {min} and {max}")]
    RatingOutOfRange { min: i32, max: i32 },

    #[error("Players cannot rate themselves")]
    SelfRating,

    #[error("User {0} is not on the match roster")]
    NotOnRoster(i32),
}

impl RuleError {
    /// True for errors caused by the limits of a paid plan.
    pub fn is_plan_limit(&self) -> bool {
        matches!(
            self,
            Self::MemberCapacityReached { .. }
                | Self::WeeklyMatchLimit { .. }
                | Self::MembershipLimit { .. }
        )
    }

    /// True for errors caused by a full or shrinking roster.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::RosterFull { .. } | Self::CapacityBelowRoster { .. }
        )
    }
}
