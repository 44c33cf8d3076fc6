pub mod attendance;
pub mod business_trip;
pub mod employee;
pub mod leave_balance;
pub mod leave_request;
pub mod role;
pub mod sick_leave;
pub mod work_schedule;
