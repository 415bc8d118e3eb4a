//! Domain types and business rules shared by the halısaha services.
//!
//! Everything here is free of I/O so the rules can be unit tested in
//! isolation; the server loads the counts and rows they need.

pub mod error;
pub mod formation;
pub mod location;
pub mod plan;
pub mod rating;
pub mod role;
pub mod roster;
pub mod schedule;
pub mod status;

pub use error::RuleError;
pub use formation::{NamedSlot, Position, PositionColumns, Team};
pub use plan::Plan;
pub use role::{MemberRole, Role};
pub use status::{AttendanceStatus, MatchStatus, MemberStatus, PaymentStatus};
