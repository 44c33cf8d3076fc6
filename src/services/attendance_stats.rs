//! Attendance percentage since the employee's tracking start.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

use crate::model::{
    attendance::AttendanceRecord,
    employee::{Employee, TrackingStartType},
    work_schedule::WorkSchedule,
};
use crate::repository::RecordSource;
use crate::services::date_range::{DateRange, year_start};
use crate::utils::schedule_cache::ScheduleCache;

pub const MISSING_HIRE_DATE: &str = "missing hire date";
pub const FUTURE_HIRE_DATE: &str = "hire date in the future";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "has_valid_data": true,
    "reason": null,
    "period_start": "2026-01-01",
    "period_end": "2026-10-19",
    "total_working_days": 208,
    "present_days": 190,
    "sick_days": 4,
    "absent_days": 14,
    "attendance_percentage": 91
}))]
pub struct AttendanceStats {
    pub has_valid_data: bool,
    /// Why the statistics could not be computed.
    pub reason: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub period_start: Option<NaiveDate>,
    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,
    pub total_working_days: u32,
    pub present_days: u32,
    pub sick_days: u32,
    pub absent_days: u32,
    pub attendance_percentage: u32,
}

impl AttendanceStats {
    fn invalid(reason: &str, today: NaiveDate) -> Self {
        Self {
            has_valid_data: false,
            reason: Some(reason.to_string()),
            period_start: None,
            period_end: today,
            total_working_days: 0,
            present_days: 0,
            sick_days: 0,
            absent_days: 0,
            attendance_percentage: 0,
        }
    }
}

/// First day attendance is expected from, or the reason there is none.
pub fn tracking_start(employee: &Employee, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let jan_first = year_start(today);
    match employee.tracking_start_type {
        TrackingStartType::FromYearStart => Ok(jan_first),
        TrackingStartType::FromHireDate => match employee.hire_date {
            None => Err(MISSING_HIRE_DATE),
            Some(hired) if hired > today => Err(FUTURE_HIRE_DATE),
            Some(hired) => Ok(hired.max(jan_first)),
        },
    }
}

/// Expected working days in `[start, today]` versus the supplied records.
pub fn compute_stats(
    employee: &Employee,
    records: &[AttendanceRecord],
    schedule: &WorkSchedule,
    today: NaiveDate,
) -> AttendanceStats {
    let start = match tracking_start(employee, today) {
        Ok(start) => start,
        Err(reason) => {
            warn!(employee_id = employee.id, reason, "Attendance statistics unavailable");
            return AttendanceStats::invalid(reason, today);
        }
    };

    let period = DateRange::new(start, today);
    let total_working_days = period.days().filter(|d| schedule.is_working_day(*d)).count() as u32;

    let in_period: Vec<&AttendanceRecord> = records.iter().filter(|r| period.contains(r.date)).collect();
    let present_days = in_period.iter().filter(|r| r.is_present()).count() as u32;
    let sick_days = in_period.iter().filter(|r| r.is_sick_leave).count() as u32;
    // Approximation: missing days are not checked against the schedule one by one.
    let absent_days = total_working_days.saturating_sub(in_period.len() as u32);

    let attendance_percentage = if total_working_days == 0 {
        0
    } else {
        (f64::from(present_days) / f64::from(total_working_days) * 100.0).round() as u32
    };

    AttendanceStats {
        has_valid_data: true,
        reason: None,
        period_start: Some(start),
        period_end: today,
        total_working_days,
        present_days,
        sick_days,
        absent_days,
        attendance_percentage,
    }
}

/// Loads what [`compute_stats`] needs for `employee_id`. `Ok(None)` when the
/// employee does not exist.
#[instrument(skip(source, schedules))]
pub async fn stats_for_employee(
    source: &dyn RecordSource,
    schedules: &ScheduleCache,
    employee_id: u64,
    today: NaiveDate,
) -> Result<Option<AttendanceStats>> {
    let Some(employee) = source.employee(employee_id).await? else {
        return Ok(None);
    };

    let schedule = schedules.schedule_for(source, employee_id).await?;
    let records = source
        .unified_attendances(employee_id, Some(DateRange::new(year_start(today), today)))
        .await?;

    let stats = compute_stats(&employee, &records, &schedule, today);
    debug!(
        total = stats.total_working_days,
        present = stats.present_days,
        percentage = stats.attendance_percentage,
        "Attendance statistics computed"
    );
    Ok(Some(stats))
}
