//! Snapshot-backed [`RecordSource`] used for fixtures, offline checks and tests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

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

#[derive(Default)]
struct Snapshot {
    business_trips: Vec<BusinessTrip>,
    leave_requests: Vec<LeaveRequest>,
    sick_leaves: Vec<SickLeave>,
    unified_attendances: Vec<AttendanceRecord>,
    manual_attendances: Vec<AttendanceRecord>,
    balances: Vec<LeaveBalance>,
    schedules: Vec<WorkSchedule>,
    employees: Vec<Employee>,
}

#[derive(Default)]
pub struct InMemoryRecords {
    snapshot: RwLock<Snapshot>,
    latency: RwLock<HashMap<u64, Duration>>,
    failing: AtomicBool,
    queries: AtomicUsize,
}

fn in_range(record: &AttendanceRecord, range: Option<DateRange>) -> bool {
    range.map_or(true, |r| r.contains(record.date))
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    fn write<F: FnOnce(&mut Snapshot)>(self, f: F) -> Self {
        if let Ok(mut snapshot) = self.snapshot.write() {
            f(&mut snapshot);
        }
        self
    }

    pub fn with_business_trip(self, trip: BusinessTrip) -> Self {
        self.write(|s| s.business_trips.push(trip))
    }

    pub fn with_leave_request(self, request: LeaveRequest) -> Self {
        self.write(|s| s.leave_requests.push(request))
    }

    pub fn with_sick_leave(self, sick: SickLeave) -> Self {
        self.write(|s| s.sick_leaves.push(sick))
    }

    pub fn with_unified_attendance(self, record: AttendanceRecord) -> Self {
        self.write(|s| s.unified_attendances.push(record))
    }

    pub fn with_manual_attendance(self, record: AttendanceRecord) -> Self {
        self.write(|s| s.manual_attendances.push(record))
    }

    pub fn with_balance(self, balance: LeaveBalance) -> Self {
        self.write(|s| s.balances.push(balance))
    }

    pub fn with_schedule(self, schedule: WorkSchedule) -> Self {
        self.write(|s| s.schedules.push(schedule))
    }

    pub fn with_employee(self, employee: Employee) -> Self {
        self.write(|s| s.employees.push(employee))
    }

    /// Every query fails while set, simulating a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every query about `user_id` by `delay`.
    pub fn set_latency(&self, user_id: u64, delay: Duration) {
        if let Ok(mut latency) = self.latency.write() {
            latency.insert(user_id, delay);
        }
    }

    /// Number of queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn begin(&self, user_id: u64) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let delay = self
            .latency
            .read()
            .map_err(|_| anyhow!("latency table poisoned"))?
            .get(&user_id)
            .copied();
        if let Some(delay) = delay {
            actix_web::rt::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            bail!("record source unavailable");
        }
        Ok(())
    }

    fn read<T, F: FnOnce(&Snapshot) -> T>(&self, f: F) -> Result<T> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| anyhow!("record snapshot poisoned"))?;
        Ok(f(&snapshot))
    }
}

#[async_trait]
impl RecordSource for InMemoryRecords {
    async fn business_trips(&self, user_id: u64, status: RequestStatus) -> Result<Vec<BusinessTrip>> {
        self.begin(user_id).await?;
        self.read(|s| {
            s.business_trips
                .iter()
                .filter(|t| t.user_id == user_id && t.status == status)
                .cloned()
                .collect()
        })
    }

    async fn leave_requests(
        &self,
        user_id: u64,
        status: RequestStatus,
        types: &[LeaveType],
    ) -> Result<Vec<LeaveRequest>> {
        self.begin(user_id).await?;
        self.read(|s| {
            s.leave_requests
                .iter()
                .filter(|r| r.user_id == user_id && r.status == status && types.contains(&r.leave_type))
                .cloned()
                .collect()
        })
    }

    async fn sick_leaves(&self, user_id: u64) -> Result<Vec<SickLeave>> {
        self.begin(user_id).await?;
        self.read(|s| {
            s.sick_leaves
                .iter()
                .filter(|l| l.user_id == user_id)
                .cloned()
                .collect()
        })
    }

    async fn unified_attendances(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.begin(user_id).await?;
        self.read(|s| {
            s.unified_attendances
                .iter()
                .filter(|a| a.user_id == user_id && in_range(a, range))
                .cloned()
                .collect()
        })
    }

    async fn manual_attendances(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.begin(user_id).await?;
        self.read(|s| {
            s.manual_attendances
                .iter()
                .filter(|a| a.user_id == user_id && in_range(a, range))
                .cloned()
                .collect()
        })
    }

    async fn leave_balance(&self, user_id: u64, year: i32) -> Result<Option<LeaveBalance>> {
        self.begin(user_id).await?;
        self.read(|s| {
            s.balances
                .iter()
                .find(|b| b.user_id == user_id && b.year == year)
                .cloned()
        })
    }

    async fn work_schedule(&self, employee_id: u64) -> Result<Option<WorkSchedule>> {
        self.begin(employee_id).await?;
        self.read(|s| {
            s.schedules
                .iter()
                .find(|w| w.employee_id == Some(employee_id))
                .or_else(|| s.schedules.iter().find(|w| w.employee_id.is_none()))
                .cloned()
        })
    }

    async fn employee(&self, user_id: u64) -> Result<Option<Employee>> {
        self.begin(user_id).await?;
        self.read(|s| s.employees.iter().find(|e| e.id == user_id).cloned())
    }
}
