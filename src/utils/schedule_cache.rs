use anyhow::Result;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::model::work_schedule::WorkSchedule;
use crate::repository::RecordSource;

/// Work schedules rarely change; keep them for a few minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Employee id => effective work schedule (own row or the global one)
#[derive(Clone)]
pub struct ScheduleCache {
    cache: Cache<u64, WorkSchedule>,
}

impl Default for ScheduleCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ScheduleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(10_000) // one entry per employee
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached schedule for `employee_id`, loading it on a miss. Falls back to
    /// Monday to Friday when no schedule row exists at all.
    pub async fn schedule_for(&self, source: &dyn RecordSource, employee_id: u64) -> Result<WorkSchedule> {
        if let Some(schedule) = self.cache.get(&employee_id).await {
            return Ok(schedule);
        }

        let schedule = match source.work_schedule(employee_id).await? {
            Some(schedule) => schedule,
            None => {
                debug!(employee_id, "No work schedule configured, assuming Monday to Friday");
                WorkSchedule::default()
            }
        };

        self.cache.insert(employee_id, schedule.clone()).await;
        Ok(schedule)
    }

    pub async fn invalidate(&self, employee_id: u64) {
        self.cache.invalidate(&employee_id).await;
    }
}
