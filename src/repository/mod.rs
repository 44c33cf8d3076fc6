//! Read-only access to the records the validation core derives from.

pub mod memory;
pub mod mysql;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{
    attendance::AttendanceRecord,
    business_trip::BusinessTrip,
    employee::Employee,
    leave_balance::LeaveBalance,
    leave_request::{LeaveRequest, LeaveType, RequestStatus},
    sick_leave::SickLeave,
    work_schedule::WorkSchedule,
};
use crate::services::date_range::DateRange;

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn business_trips(&self, user_id: u64, status: RequestStatus) -> Result<Vec<BusinessTrip>>;

    /// Leave requests of `user_id` in `status` whose type is one of `types`.
    async fn leave_requests(
        &self,
        user_id: u64,
        status: RequestStatus,
        types: &[LeaveType],
    ) -> Result<Vec<LeaveRequest>>;

    async fn sick_leaves(&self, user_id: u64) -> Result<Vec<SickLeave>>;

    async fn unified_attendances(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>>;

    async fn manual_attendances(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>>;

    async fn leave_balance(&self, user_id: u64, year: i32) -> Result<Option<LeaveBalance>>;

    /// The employee's own schedule, or the company-wide one when they have none.
    async fn work_schedule(&self, employee_id: u64) -> Result<Option<WorkSchedule>>;

    async fn employee(&self, user_id: u64) -> Result<Option<Employee>>;
}
