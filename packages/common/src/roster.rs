use crate::error::RuleError;

/// Smallest allowed match capacity.
pub const MIN_CAPACITY: i32 = 2;

/// Largest allowed match capacity.
pub const MAX_CAPACITY: i32 = 50;

/// Check that one more player fits on a roster of `roster_size`.
pub fn check_roster_capacity(capacity: i32, roster_size: u64) -> Result<(), RuleError> {
    if roster_size >= u64::try_from(capacity).unwrap_or(0) {
        return Err(RuleError::RosterFull { capacity });
    }
    Ok(())
}

/// Check that a match can shrink to `new_capacity` without dropping players.
pub fn check_capacity_change(new_capacity: i32, roster_size: u64) -> Result<(), RuleError> {
    if u64::try_from(new_capacity).unwrap_or(0) < roster_size {
        return Err(RuleError::CapacityBelowRoster { roster_size });
    }
    Ok(())
}
