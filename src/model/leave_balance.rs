use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Yearly entitlement counters for one employee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 26.0)]
    pub vacation_days_total: f64,
    #[schema(example = 4.0)]
    pub vacation_days_used: f64,
    #[schema(example = 32.0)]
    pub permission_hours_total: f64,
    #[schema(example = 6.5)]
    pub permission_hours_used: f64,
}

impl LeaveBalance {
    pub fn vacation_days_remaining(&self) -> f64 {
        (self.vacation_days_total - self.vacation_days_used).max(0.0)
    }

    pub fn permission_hours_remaining(&self) -> f64 {
        (self.permission_hours_total - self.permission_hours_used).max(0.0)
    }
}
