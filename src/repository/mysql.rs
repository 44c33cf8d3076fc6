use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{MySqlPool, prelude::FromRow};
use tracing::debug;

use super::RecordSource;
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

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Date(NaiveDate),
}

#[derive(FromRow)]
struct BusinessTripRow {
    id: u64,
    user_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    destination: String,
}

#[derive(FromRow)]
struct LeaveRequestRow {
    id: u64,
    user_id: u64,
    leave_type: String,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    day: Option<NaiveDate>,
    time_from: Option<NaiveTime>,
    time_to: Option<NaiveTime>,
    status: String,
}

#[derive(FromRow)]
struct SickLeaveRow {
    id: u64,
    user_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reference_code: Option<String>,
}

#[derive(FromRow)]
struct UnifiedAttendanceRow {
    user_id: u64,
    date: NaiveDate,
    check_in_time: Option<NaiveTime>,
    check_out_time: Option<NaiveTime>,
    is_business_trip: bool,
    is_sick_leave: bool,
}

#[derive(FromRow)]
struct ManualAttendanceRow {
    user_id: u64,
    date: NaiveDate,
    check_in_time: Option<NaiveTime>,
    check_out_time: Option<NaiveTime>,
    is_sick_leave: bool,
}

#[derive(FromRow)]
struct LeaveBalanceRow {
    user_id: u64,
    year: i32,
    vacation_days_total: f64,
    vacation_days_used: f64,
    permission_hours_total: f64,
    permission_hours_used: f64,
}

#[derive(FromRow)]
struct WorkScheduleRow {
    employee_id: Option<u64>,
    monday: bool,
    tuesday: bool,
    wednesday: bool,
    thursday: bool,
    friday: bool,
    saturday: bool,
    sunday: bool,
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    is_active: bool,
    hire_date: Option<NaiveDate>,
    tracking_start_type: String,
}

fn parse_status(value: &str) -> Result<RequestStatus> {
    value
        .parse()
        .map_err(|_| anyhow!("Unknown request status in database: {}", value))
}

impl TryFrom<BusinessTripRow> for BusinessTrip {
    type Error = anyhow::Error;

    fn try_from(row: BusinessTripRow) -> Result<Self> {
        Ok(BusinessTrip {
            id: row.id,
            user_id: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
            status: parse_status(&row.status)?,
            destination: row.destination,
        })
    }
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = anyhow::Error;

    fn try_from(row: LeaveRequestRow) -> Result<Self> {
        Ok(LeaveRequest {
            id: row.id,
            user_id: row.user_id,
            leave_type: row
                .leave_type
                .parse()
                .map_err(|_| anyhow!("Unknown leave type in database: {}", row.leave_type))?,
            date_from: row.date_from,
            date_to: row.date_to,
            day: row.day,
            time_from: row.time_from,
            time_to: row.time_to,
            status: parse_status(&row.status)?,
        })
    }
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = anyhow::Error;

    fn try_from(row: EmployeeRow) -> Result<Self> {
        Ok(Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row
                .role
                .parse()
                .map_err(|_| anyhow!("Unknown role in database: {}", row.role))?,
            is_active: row.is_active,
            hire_date: row.hire_date,
            tracking_start_type: row.tracking_start_type.parse().map_err(|_| {
                anyhow!(
                    "Unknown tracking start type in database: {}",
                    row.tracking_start_type
                )
            })?,
        })
    }
}

/// [`RecordSource`] backed by the MySQL database.
#[derive(Clone)]
pub struct MySqlRecords {
    pool: MySqlPool,
}

impl MySqlRecords {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Appends `AND date BETWEEN ? AND ?` when a window is given.
    fn push_range<'a>(where_sql: &mut String, args: &mut Vec<FilterValue<'a>>, range: Option<DateRange>) {
        if let Some(range) = range {
            where_sql.push_str(" AND date BETWEEN ? AND ?");
            args.push(FilterValue::Date(range.from));
            args.push(FilterValue::Date(range.to));
        }
    }

    async fn fetch_rows<T>(&self, sql: &str, args: Vec<FilterValue<'_>>) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, sqlx::mysql::MySqlRow> + Send + Unpin,
    {
        let mut query = sqlx::query_as::<_, T>(sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
                FilterValue::Date(d) => query.bind(d),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

#[async_trait]
impl RecordSource for MySqlRecords {
    async fn business_trips(&self, user_id: u64, status: RequestStatus) -> Result<Vec<BusinessTrip>> {
        let rows: Vec<BusinessTripRow> = self
            .fetch_rows(
                r#"
                SELECT id, user_id, start_date, end_date, status, destination
                FROM business_trips
                WHERE user_id = ? AND status = ?
                "#,
                vec![FilterValue::U64(user_id), FilterValue::Str(status.as_ref())],
            )
            .await
            .with_context(|| format!("Failed to fetch business trips for user {}", user_id))?;

        rows.into_iter().map(BusinessTrip::try_from).collect()
    }

    async fn leave_requests(
        &self,
        user_id: u64,
        status: RequestStatus,
        types: &[LeaveType],
    ) -> Result<Vec<LeaveRequest>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec![FilterValue::U64(user_id), FilterValue::Str(status.as_ref())];
        let placeholders = types.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        args.extend(types.iter().map(|t| FilterValue::Str(t.as_ref())));

        let sql = format!(
            r#"
            SELECT id, user_id, type AS leave_type, date_from, date_to, day,
                   time_from, time_to, status
            FROM leave_requests
            WHERE user_id = ? AND status = ? AND type IN ({})
            "#,
            placeholders
        );

        let rows: Vec<LeaveRequestRow> = self
            .fetch_rows(&sql, args)
            .await
            .with_context(|| format!("Failed to fetch leave requests for user {}", user_id))?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn sick_leaves(&self, user_id: u64) -> Result<Vec<SickLeave>> {
        let rows: Vec<SickLeaveRow> = self
            .fetch_rows(
                r#"
                SELECT id, user_id, start_date, end_date, reference_code
                FROM sick_leaves
                WHERE user_id = ?
                "#,
                vec![FilterValue::U64(user_id)],
            )
            .await
            .with_context(|| format!("Failed to fetch sick leaves for user {}", user_id))?;

        Ok(rows
            .into_iter()
            .map(|row| SickLeave {
                id: row.id,
                user_id: row.user_id,
                start_date: row.start_date,
                end_date: row.end_date,
                reference_code: row.reference_code,
            })
            .collect())
    }

    async fn unified_attendances(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut where_sql = String::from(" WHERE user_id = ?");
        let mut args = vec![FilterValue::U64(user_id)];
        Self::push_range(&mut where_sql, &mut args, range);

        let sql = format!(
            r#"
            SELECT user_id, date, check_in_time, check_out_time, is_business_trip, is_sick_leave
            FROM unified_attendances
            {}
            ORDER BY date
            "#,
            where_sql
        );

        let rows: Vec<UnifiedAttendanceRow> = self
            .fetch_rows(&sql, args)
            .await
            .with_context(|| format!("Failed to fetch unified attendances for user {}", user_id))?;

        debug!(user_id, count = rows.len(), "Fetched unified attendances");

        Ok(rows
            .into_iter()
            .map(|row| AttendanceRecord {
                user_id: row.user_id,
                date: row.date,
                check_in_time: row.check_in_time,
                check_out_time: row.check_out_time,
                is_business_trip: row.is_business_trip,
                is_sick_leave: row.is_sick_leave,
            })
            .collect())
    }

    async fn manual_attendances(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut where_sql = String::from(" WHERE user_id = ?");
        let mut args = vec![FilterValue::U64(user_id)];
        Self::push_range(&mut where_sql, &mut args, range);

        let sql = format!(
            r#"
            SELECT user_id, date, check_in_time, check_out_time, is_sick_leave
            FROM manual_attendances
            {}
            ORDER BY date
            "#,
            where_sql
        );

        let rows: Vec<ManualAttendanceRow> = self
            .fetch_rows(&sql, args)
            .await
            .with_context(|| format!("Failed to fetch manual attendances for user {}", user_id))?;

        Ok(rows
            .into_iter()
            .map(|row| AttendanceRecord {
                user_id: row.user_id,
                date: row.date,
                check_in_time: row.check_in_time,
                check_out_time: row.check_out_time,
                is_business_trip: false,
                is_sick_leave: row.is_sick_leave,
            })
            .collect())
    }

    async fn leave_balance(&self, user_id: u64, year: i32) -> Result<Option<LeaveBalance>> {
        let row = sqlx::query_as::<_, LeaveBalanceRow>(
            r#"
            SELECT user_id, year,
                   CAST(vacation_days_total AS DOUBLE) AS vacation_days_total,
                   CAST(vacation_days_used AS DOUBLE) AS vacation_days_used,
                   CAST(permission_hours_total AS DOUBLE) AS permission_hours_total,
                   CAST(permission_hours_used AS DOUBLE) AS permission_hours_used
            FROM employee_leave_balance
            WHERE user_id = ? AND year = ?
            "#,
        )
        .bind(user_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch leave balance for user {} in {}", user_id, year))?;

        Ok(row.map(|row| LeaveBalance {
            user_id: row.user_id,
            year: row.year,
            vacation_days_total: row.vacation_days_total,
            vacation_days_used: row.vacation_days_used,
            permission_hours_total: row.permission_hours_total,
            permission_hours_used: row.permission_hours_used,
        }))
    }

    async fn work_schedule(&self, employee_id: u64) -> Result<Option<WorkSchedule>> {
        // Per-employee row sorts before the global (NULL) one.
        let row = sqlx::query_as::<_, WorkScheduleRow>(
            r#"
            SELECT employee_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday
            FROM work_schedules
            WHERE employee_id = ? OR employee_id IS NULL
            ORDER BY employee_id IS NULL
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch work schedule for employee {}", employee_id))?;

        Ok(row.map(|row| WorkSchedule {
            employee_id: row.employee_id,
            monday: row.monday,
            tuesday: row.tuesday,
            wednesday: row.wednesday,
            thursday: row.thursday,
            friday: row.friday,
            saturday: row.saturday,
            sunday: row.sunday,
        }))
    }

    async fn employee(&self, user_id: u64) -> Result<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, first_name, last_name, email, role, is_active, hire_date, tracking_start_type
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch employee {}", user_id))?;

        row.map(Employee::try_from).transpose()
    }
}
