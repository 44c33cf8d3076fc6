use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::leave_request::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessTrip {
    pub id: u64,
    pub user_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RequestStatus,
    pub destination: String,
}
