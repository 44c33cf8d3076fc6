use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::services::date_range;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    /// Annual paid vacation, requested as a date range.
    Ferie,
    /// Hour-denominated permission, requested as a single day.
    Permesso,
    /// Legacy sick-leave type; new sick periods live in their own table.
    Malattia,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: u64,
    pub user_id: u64,
    pub leave_type: LeaveType,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub day: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    pub status: RequestStatus,
}

impl LeaveRequest {
    /// Calendar days blocked by this request. A range row yields every day
    /// of the range, a single-day row yields exactly that day.
    pub fn covered_days(&self) -> Vec<NaiveDate> {
        match (self.date_from, self.date_to, self.day) {
            (Some(from), Some(to), _) => date_range::expand_inclusive(from, to),
            (Some(from), None, _) => vec![from],
            (None, _, Some(day)) => vec![day],
            _ => Vec::new(),
        }
    }
}
