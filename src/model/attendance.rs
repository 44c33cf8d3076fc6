use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One presence entry for one employee on one date. Unified and manual
/// attendances share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in_time: Option<NaiveTime>,
    pub check_out_time: Option<NaiveTime>,
    pub is_business_trip: bool,
    pub is_sick_leave: bool,
}

impl AttendanceRecord {
    pub fn is_present(&self) -> bool {
        self.check_in_time.is_some() && !self.is_sick_leave
    }
}
