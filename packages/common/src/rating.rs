use crate::error::RuleError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Check that `rater_id` may give `rating` to `rated_user_id`.
///
/// Both players must be on the match roster and nobody rates themselves.
pub fn check_rating(
    rater_id: i32,
    rated_user_id: i32,
    rating: i32,
    roster: &[i32],
) -> Result<(), RuleError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(RuleError::RatingOutOfRange {
            min: MIN_RATING,
            max: MAX_RATING,
        });
    }
    if rater_id == rated_user_id {
        return Err(RuleError::SelfRating);
    }
    for user_id in [rater_id, rated_user_id] {
        if !roster.contains(&user_id) {
            return Err(RuleError::NotOnRoster(user_id));
        }
    }
    Ok(())
}

/// Mean of the given ratings, rounded to two decimals.
pub fn average(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}
