//! Blocked-date computation for new business trips, manual attendances and
//! overtime entries.
//!
//! Every applicable record of every selected employee is expanded into the
//! calendar days it covers and unioned into one set. The set is keyed by date
//! only: a day is blocked if *any* selected employee is busy on it.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt, try_join_all};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use crate::model::leave_request::{LeaveRequest, LeaveType, RequestStatus};
use crate::repository::RecordSource;
use crate::services::date_range::expand_inclusive;

/// The kind of record about to be created. Selects which sources can block a day.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConflictContext {
    BusinessTrip,
    ManualAttendance,
    Overtime,
}

/// What `is_date_disabled` answers after a failed computation.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailurePolicy {
    /// Nothing is disabled; the error flag is the only signal.
    FailOpen,
    /// Every date is disabled until a computation succeeds.
    #[default]
    FailClosed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SourceCategory {
    BusinessTrips,
    Leave(&'static [LeaveType]),
    SickLeaves,
    UnifiedAttendance,
    ManualAttendance,
}

const BUSINESS_TRIP_SOURCES: &[SourceCategory] = &[
    SourceCategory::BusinessTrips,
    SourceCategory::Leave(&[LeaveType::Ferie, LeaveType::Permesso, LeaveType::Malattia]),
    SourceCategory::SickLeaves,
    SourceCategory::UnifiedAttendance,
];

const MANUAL_ATTENDANCE_SOURCES: &[SourceCategory] = &[
    SourceCategory::BusinessTrips,
    SourceCategory::Leave(&[LeaveType::Ferie]),
    SourceCategory::UnifiedAttendance,
    SourceCategory::ManualAttendance,
];

const OVERTIME_SOURCES: &[SourceCategory] = &[
    SourceCategory::BusinessTrips,
    SourceCategory::Leave(&[LeaveType::Ferie, LeaveType::Permesso]),
    SourceCategory::SickLeaves,
];

impl ConflictContext {
    fn sources(&self) -> &'static [SourceCategory] {
        match self {
            ConflictContext::BusinessTrip => BUSINESS_TRIP_SOURCES,
            ConflictContext::ManualAttendance => MANUAL_ATTENDANCE_SOURCES,
            ConflictContext::Overtime => OVERTIME_SOURCES,
        }
    }
}

/// Result of one conflict computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct ConflictSet {
    /// Blocked days, ascending, serialised as `YYYY-MM-DD`.
    #[schema(value_type = Vec<String>, example = json!(["2024-03-01", "2024-03-02"]))]
    pub dates: BTreeSet<NaiveDate>,
    /// Set when the computation failed; `dates` is then empty.
    #[schema(example = json!(null))]
    pub error: Option<String>,
    /// True when a failed computation disables every date.
    #[schema(example = false)]
    pub blocks_all: bool,
}

impl ConflictSet {
    pub fn from_dates(dates: BTreeSet<NaiveDate>) -> Self {
        Self {
            dates,
            error: None,
            blocks_all: false,
        }
    }

    pub fn failed(message: impl Into<String>, policy: FailurePolicy) -> Self {
        Self {
            dates: BTreeSet::new(),
            error: Some(message.into()),
            blocks_all: policy == FailurePolicy::FailClosed,
        }
    }

    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        self.blocks_all || self.dates.contains(&date)
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

fn source_days(
    source: &dyn RecordSource,
    user_id: u64,
    category: SourceCategory,
) -> BoxFuture<'_, Result<Vec<NaiveDate>>> {
    async move {
        let days: Vec<NaiveDate> = match category {
            SourceCategory::BusinessTrips => source
                .business_trips(user_id, RequestStatus::Approved)
                .await?
                .iter()
                .flat_map(|t| expand_inclusive(t.start_date, t.end_date))
                .collect(),
            SourceCategory::Leave(types) => source
                .leave_requests(user_id, RequestStatus::Approved, types)
                .await?
                .iter()
                .flat_map(LeaveRequest::covered_days)
                .collect(),
            SourceCategory::SickLeaves => source
                .sick_leaves(user_id)
                .await?
                .iter()
                .flat_map(|s| expand_inclusive(s.start_date, s.end_date))
                .collect(),
            SourceCategory::UnifiedAttendance => source
                .unified_attendances(user_id, None)
                .await?
                .iter()
                .map(|a| a.date)
                .collect(),
            SourceCategory::ManualAttendance => source
                .manual_attendances(user_id, None)
                .await?
                .iter()
                .map(|a| a.date)
                .collect(),
        };
        debug!(user_id, ?category, days = days.len(), "Collected blocked days");
        Ok(days)
    }
    .boxed()
}

/// Union of blocked days, or the first query error.
///
/// All sub-queries are issued together; a single failure fails the whole
/// computation.
pub async fn collect_conflict_dates(
    source: &dyn RecordSource,
    employee_ids: &[u64],
    context: ConflictContext,
) -> Result<BTreeSet<NaiveDate>> {
    let employees: BTreeSet<u64> = employee_ids.iter().copied().collect();
    if employees.is_empty() {
        return Ok(BTreeSet::new());
    }

    let queries = employees.iter().flat_map(|&user_id| {
        context
            .sources()
            .iter()
            .map(move |&category| source_days(source, user_id, category))
    });

    let per_source = try_join_all(queries).await?;
    Ok(per_source.into_iter().flatten().collect())
}

/// Blocked days for a new record of kind `context` shared by `employee_ids`.
///
/// Query failures never escape: they become a [`ConflictSet::failed`] shaped
/// by `policy`.
#[instrument(name = "compute_conflict_dates", skip(source), fields(employees = employee_ids.len()))]
pub async fn compute_conflict_dates(
    source: &dyn RecordSource,
    employee_ids: &[u64],
    context: ConflictContext,
    policy: FailurePolicy,
) -> ConflictSet {
    match collect_conflict_dates(source, employee_ids, context).await {
        Ok(dates) => {
            debug!(blocked = dates.len(), "Conflict computation finished");
            ConflictSet::from_dates(dates)
        }
        Err(e) => {
            error!(error = %e, "Conflict computation failed");
            ConflictSet::failed(format!("Unable to load existing records: {}", e), policy)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{
        attendance::AttendanceRecord, business_trip::BusinessTrip, sick_leave::SickLeave,
    };
    use crate::repository::memory::InMemoryRecords;

    pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn trip(user_id: u64, from: NaiveDate, to: NaiveDate, status: RequestStatus) -> BusinessTrip {
        BusinessTrip {
            id: 1,
            user_id,
            start_date: from,
            end_date: to,
            status,
            destination: "Milano".into(),
        }
    }

    fn vacation(user_id: u64, from: NaiveDate, to: NaiveDate) -> LeaveRequest {
        LeaveRequest {
            id: 2,
            user_id,
            leave_type: LeaveType::Ferie,
            date_from: Some(from),
            date_to: Some(to),
            day: None,
            time_from: None,
            time_to: None,
            status: RequestStatus::Approved,
        }
    }

    fn permission(user_id: u64, day: NaiveDate) -> LeaveRequest {
        LeaveRequest {
            id: 3,
            user_id,
            leave_type: LeaveType::Permesso,
            date_from: None,
            date_to: None,
            day: Some(day),
            time_from: None,
            time_to: None,
            status: RequestStatus::Approved,
        }
    }

    fn attendance(user_id: u64, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            user_id,
            date,
            check_in_time: None,
            check_out_time: None,
            is_business_trip: false,
            is_sick_leave: false,
        }
    }

    fn sick(user_id: u64, from: NaiveDate, to: NaiveDate) -> SickLeave {
        SickLeave {
            id: 4,
            user_id,
            start_date: from,
            end_date: to,
            reference_code: None,
        }
    }

    #[actix_web::test]
    async fn no_employees_means_no_conflicts_and_no_queries() {
        let source = InMemoryRecords::new();
        let set = compute_conflict_dates(&source, &[], ConflictContext::BusinessTrip, FailurePolicy::FailClosed).await;
        assert!(set.is_empty());
        assert!(!set.has_error());
        assert_eq!(source.query_count(), 0);
    }

    #[actix_web::test]
    async fn approved_trip_blocks_every_day_of_its_range() {
        let source = InMemoryRecords::new().with_business_trip(trip(
            1,
            d(2024, 3, 1),
            d(2024, 3, 3),
            RequestStatus::Approved,
        ));

        let set = compute_conflict_dates(&source, &[1], ConflictContext::BusinessTrip, FailurePolicy::FailClosed).await;

        assert!(set.is_date_disabled(d(2024, 3, 1)));
        assert!(set.is_date_disabled(d(2024, 3, 2)));
        assert!(set.is_date_disabled(d(2024, 3, 3)));
        assert!(!set.is_date_disabled(d(2024, 3, 5)));
        assert!(!set.is_date_disabled(d(2024, 2, 29)));
    }

    #[actix_web::test]
    async fn pending_trips_do_not_block() {
        let source = InMemoryRecords::new().with_business_trip(trip(
            1,
            d(2024, 3, 1),
            d(2024, 3, 3),
            RequestStatus::Pending,
        ));
        let set = compute_conflict_dates(&source, &[1], ConflictContext::Overtime, FailurePolicy::FailClosed).await;
        assert!(set.is_empty());
    }

    #[actix_web::test]
    async fn single_day_permission_blocks_only_its_day() {
        let source = InMemoryRecords::new().with_leave_request(permission(1, d(2024, 4, 10)));
        let set = compute_conflict_dates(&source, &[1], ConflictContext::Overtime, FailurePolicy::FailClosed).await;

        assert_eq!(set.dates.iter().copied().collect::<Vec<_>>(), vec![d(2024, 4, 10)]);
        assert!(!set.is_date_disabled(d(2024, 4, 9)));
        assert!(!set.is_date_disabled(d(2024, 4, 11)));
    }

    #[actix_web::test]
    async fn conflicts_are_unioned_across_employees() {
        let source = InMemoryRecords::new()
            .with_business_trip(trip(1, d(2024, 3, 1), d(2024, 3, 2), RequestStatus::Approved))
            .with_leave_request(vacation(2, d(2024, 3, 2), d(2024, 3, 4)));

        let set = compute_conflict_dates(&source, &[1, 2], ConflictContext::Overtime, FailurePolicy::FailClosed).await;

        assert_eq!(set.len(), 4);
        assert!(set.is_date_disabled(d(2024, 3, 4)));
    }

    #[actix_web::test]
    async fn manual_attendance_context_ignores_permissions_and_sick_leave() {
        let source = InMemoryRecords::new()
            .with_leave_request(permission(1, d(2024, 4, 10)))
            .with_sick_leave(sick(1, d(2024, 4, 15), d(2024, 4, 16)))
            .with_leave_request(vacation(1, d(2024, 4, 20), d(2024, 4, 20)))
            .with_manual_attendance(attendance(1, d(2024, 4, 22)))
            .with_unified_attendance(attendance(1, d(2024, 4, 23)));

        let set = compute_conflict_dates(&source, &[1], ConflictContext::ManualAttendance, FailurePolicy::FailClosed).await;

        assert_eq!(
            set.dates.iter().copied().collect::<Vec<_>>(),
            vec![d(2024, 4, 20), d(2024, 4, 22), d(2024, 4, 23)]
        );
    }

    #[actix_web::test]
    async fn overtime_context_ignores_existing_attendance() {
        let source = InMemoryRecords::new()
            .with_unified_attendance(attendance(1, d(2024, 4, 23)))
            .with_sick_leave(sick(1, d(2024, 4, 15), d(2024, 4, 16)));

        let set = compute_conflict_dates(&source, &[1], ConflictContext::Overtime, FailurePolicy::FailClosed).await;

        assert_eq!(set.dates.iter().copied().collect::<Vec<_>>(), vec![d(2024, 4, 15), d(2024, 4, 16)]);
    }

    #[actix_web::test]
    async fn business_trip_context_checks_every_source() {
        let mut legacy_sick = vacation(1, d(2024, 5, 1), d(2024, 5, 1));
        legacy_sick.leave_type = LeaveType::Malattia;

        let source = InMemoryRecords::new()
            .with_leave_request(legacy_sick)
            .with_leave_request(permission(1, d(2024, 5, 2)))
            .with_sick_leave(sick(1, d(2024, 5, 3), d(2024, 5, 3)))
            .with_unified_attendance(attendance(1, d(2024, 5, 6)))
            .with_manual_attendance(attendance(1, d(2024, 5, 7)));

        let set = compute_conflict_dates(&source, &[1], ConflictContext::BusinessTrip, FailurePolicy::FailClosed).await;

        assert_eq!(
            set.dates.iter().copied().collect::<Vec<_>>(),
            vec![d(2024, 5, 1), d(2024, 5, 2), d(2024, 5, 3), d(2024, 5, 6)]
        );
    }

    #[actix_web::test]
    async fn identical_inputs_yield_identical_sets() {
        let source = InMemoryRecords::new()
            .with_business_trip(trip(1, d(2024, 3, 1), d(2024, 3, 3), RequestStatus::Approved))
            .with_leave_request(permission(2, d(2024, 3, 8)));

        let first = compute_conflict_dates(&source, &[1, 2], ConflictContext::Overtime, FailurePolicy::FailClosed).await;
        let second = compute_conflict_dates(&source, &[2, 1], ConflictContext::Overtime, FailurePolicy::FailClosed).await;
        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn failure_fails_closed_by_default() {
        let source = InMemoryRecords::new()
            .with_business_trip(trip(1, d(2024, 3, 1), d(2024, 3, 3), RequestStatus::Approved));
        source.set_failing(true);

        let set = compute_conflict_dates(&source, &[1], ConflictContext::Overtime, FailurePolicy::default()).await;

        assert!(set.has_error());
        assert!(set.is_empty());
        assert!(set.is_date_disabled(d(2030, 1, 1)));
    }

    #[actix_web::test]
    async fn failure_can_fail_open() {
        let source = InMemoryRecords::new();
        source.set_failing(true);

        let set = compute_conflict_dates(&source, &[1], ConflictContext::Overtime, FailurePolicy::FailOpen).await;

        assert!(set.has_error());
        assert!(!set.is_date_disabled(d(2024, 3, 2)));
    }

    #[test]
    fn context_parses_from_query_text() {
        assert_eq!("manual_attendance".parse::<ConflictContext>().unwrap(), ConflictContext::ManualAttendance);
        assert_eq!(ConflictContext::BusinessTrip.to_string(), "business_trip");
        assert_eq!("fail_open".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailOpen);
    }
}
