use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::role::Role;

/// Where attendance tracking begins for an employee.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrackingStartType {
    FromHireDate,
    #[default]
    FromYearStart,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Giulia",
        "last_name": "Bianchi",
        "email": "giulia.bianchi@company.com",
        "role": "employee",
        "is_active": true,
        "hire_date": "2024-03-11",
        "tracking_start_type": "from_hire_date"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Giulia")]
    pub first_name: String,

    #[schema(example = "Bianchi")]
    pub last_name: String,

    #[schema(example = "giulia.bianchi@company.com")]
    pub email: String,

    pub role: Role,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(example = "2024-03-11", value_type = Option<String>, format = "date")]
    pub hire_date: Option<NaiveDate>,

    pub tracking_start_type: TrackingStartType,
}
