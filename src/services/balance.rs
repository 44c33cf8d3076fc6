//! Leave-request validation against the yearly entitlement.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::LeaveType;
use crate::repository::RecordSource;
use crate::services::date_range::count_weekdays;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveValidationRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "ferie")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-08-03", value_type = Option<String>, format = "date")]
    pub date_from: Option<NaiveDate>,
    #[schema(example = "2026-08-14", value_type = Option<String>, format = "date")]
    pub date_to: Option<NaiveDate>,
    #[schema(example = json!(null), value_type = Option<String>, format = "date")]
    pub day: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`
    #[schema(example = json!(null))]
    pub time_from: Option<String>,
    /// `HH:MM` or `HH:MM:SS`
    #[schema(example = json!(null))]
    pub time_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "is_valid": false,
    "exceeds_vacation_limit": true,
    "exceeds_permission_limit": false,
    "error_message": "Requested 10 vacation days exceed the 6 remaining",
    "vacation_days_remaining": 6.0,
    "permission_hours_remaining": 12.0,
    "requested_days": 10,
    "requested_hours": null
}))]
pub struct ValidationResult {
    pub is_valid: bool,
    pub exceeds_vacation_limit: bool,
    pub exceeds_permission_limit: bool,
    pub error_message: Option<String>,
    pub vacation_days_remaining: f64,
    pub permission_hours_remaining: f64,
    pub requested_days: Option<i64>,
    pub requested_hours: Option<f64>,
}

impl ValidationResult {
    fn with_balance(balance: &LeaveBalance) -> Self {
        Self {
            is_valid: true,
            exceeds_vacation_limit: false,
            exceeds_permission_limit: false,
            error_message: None,
            vacation_days_remaining: balance.vacation_days_remaining(),
            permission_hours_remaining: balance.permission_hours_remaining(),
            requested_days: None,
            requested_hours: None,
        }
    }

    /// Nothing can be granted: both limits count as exceeded.
    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            exceeds_vacation_limit: true,
            exceeds_permission_limit: true,
            error_message: Some(message.into()),
            vacation_days_remaining: 0.0,
            permission_hours_remaining: 0.0,
            requested_days: None,
            requested_hours: None,
        }
    }

    /// The balance could not be read. Limits are unknown, not exceeded.
    fn lookup_failed(message: impl Into<String>) -> Self {
        Self {
            exceeds_vacation_limit: false,
            exceeds_permission_limit: false,
            ..Self::unavailable(message)
        }
    }

    fn reject(mut self, message: impl Into<String>) -> Self {
        self.is_valid = false;
        self.error_message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceSummary {
    pub balance: LeaveBalance,
    #[schema(example = 22.0)]
    pub vacation_days_remaining: f64,
    #[schema(example = 25.5)]
    pub permission_hours_remaining: f64,
}

impl From<LeaveBalance> for BalanceSummary {
    fn from(balance: LeaveBalance) -> Self {
        Self {
            vacation_days_remaining: balance.vacation_days_remaining(),
            permission_hours_remaining: balance.permission_hours_remaining(),
            balance,
        }
    }
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Decimal hours from `from` to `to` on the same day. Negative when `to`
/// precedes `from`.
pub fn hours_between(from: NaiveTime, to: NaiveTime) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

/// Checks `request` against `balance`, the employee's row for the current year.
///
/// Every outcome, including malformed input and a missing balance row, is a
/// [`ValidationResult`].
pub fn validate_leave_request(
    balance: Option<&LeaveBalance>,
    request: &LeaveValidationRequest,
    year: i32,
) -> ValidationResult {
    let Some(balance) = balance else {
        return ValidationResult::unavailable(format!(
            "No leave balance configured for {}. Contact an administrator.",
            year
        ));
    };

    let result = ValidationResult::with_balance(balance);

    match request.leave_type {
        LeaveType::Ferie => validate_vacation(result, request),
        LeaveType::Permesso => validate_permission(result, request),
        LeaveType::Malattia => result,
    }
}

fn validate_vacation(mut result: ValidationResult, request: &LeaveValidationRequest) -> ValidationResult {
    // A start date alone is a one-day request.
    let range = request.date_from.map(|from| (from, request.date_to.unwrap_or(from)));
    let remaining = result.vacation_days_remaining;

    // An exhausted balance rejects any request, well-formed or not.
    if remaining <= 0.0 {
        result.exceeds_vacation_limit = true;
        result.requested_days = range.filter(|(from, to)| from <= to).map(|(from, to)| count_weekdays(from, to));
        return result.reject("Vacation balance exhausted: no days remaining");
    }

    let Some((from, to)) = range else {
        return result.reject("A start date is required for a vacation request");
    };
    if to < from {
        return result.reject("End date cannot be before start date");
    }

    let requested = count_weekdays(from, to);
    result.requested_days = Some(requested);

    if requested as f64 > remaining {
        result.exceeds_vacation_limit = true;
        return result.reject(format!(
            "Requested {} vacation days exceed the {} remaining",
            requested, remaining
        ));
    }
    result
}

fn validate_permission(mut result: ValidationResult, request: &LeaveValidationRequest) -> ValidationResult {
    let (Some(time_from), Some(time_to)) = (request.time_from.as_deref(), request.time_to.as_deref()) else {
        return result.reject("Start and end time are required for a permission request");
    };
    let (Some(from), Some(to)) = (parse_clock(time_from), parse_clock(time_to)) else {
        return result.reject("Times must be formatted as HH:MM");
    };

    let requested = hours_between(from, to);
    if requested <= 0.0 {
        return result.reject("End time must be after start time");
    }
    result.requested_hours = Some(requested);
    let remaining = result.permission_hours_remaining;

    if remaining <= 0.0 {
        result.exceeds_permission_limit = true;
        return result.reject("Permission balance exhausted: no hours remaining");
    }
    if requested > remaining {
        result.exceeds_permission_limit = true;
        return result.reject(format!(
            "Requested {:.2} permission hours exceed the {:.2} remaining",
            requested, remaining
        ));
    }
    result
}

/// Fetches the employee's balance for `year` and validates `request` against it.
/// A failed lookup is reported as an invalid result, never as an error, and
/// does not flag either limit as exceeded.
#[instrument(skip(source, request), fields(employee_id = request.employee_id, leave_type = %request.leave_type))]
pub async fn validate_for_employee(
    source: &dyn RecordSource,
    request: &LeaveValidationRequest,
    year: i32,
) -> ValidationResult {
    match source.leave_balance(request.employee_id, year).await {
        Ok(balance) => {
            let result = validate_leave_request(balance.as_ref(), request, year);
            info!(is_valid = result.is_valid, "Leave request validated");
            result
        }
        Err(e) => {
            error!(error = %e, "Failed to load leave balance");
            ValidationResult::lookup_failed("Unable to verify the leave balance, please retry")
        }
    }
}
