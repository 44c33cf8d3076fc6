pub mod attendance_stats;
pub mod balance;
pub mod conflict_session;
pub mod conflicts;
pub mod date_range;
