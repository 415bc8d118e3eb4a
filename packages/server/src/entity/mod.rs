pub mod facility;
pub mod match_attendance;
pub mod match_rating;
pub mod match_roster;
pub mod match_score;
pub mod matches;
pub mod organization;
pub mod organization_member;
pub mod payment;
pub mod user;
