pub mod attendance;
pub mod auth;
pub mod billing;
pub mod facility;
pub mod matches;
pub mod organization;
pub mod rating;
pub mod roster;
pub mod score;
pub mod shared;
