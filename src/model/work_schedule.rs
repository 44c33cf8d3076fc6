use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which weekdays count as working days for attendance tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkSchedule {
    /// `None` for the company-wide schedule.
    pub employee_id: Option<u64>,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self {
            employee_id: None,
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
        }
    }
}

impl WorkSchedule {
    pub fn is_working_weekday(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.is_working_weekday(date.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_monday_to_friday() {
        let schedule = WorkSchedule::default();
        // 2025-01-06 is a Monday
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        assert!(schedule.is_working_day(monday));
        assert!(!schedule.is_working_day(saturday));
    }
}
