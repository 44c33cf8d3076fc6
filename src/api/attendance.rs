use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::error::ServiceError;
use crate::repository::RecordSource;
use crate::services::attendance_stats::{AttendanceStats, stats_for_employee};
use crate::utils::schedule_cache::ScheduleCache;

/// Attendance percentage since the employee's tracking start
#[utoipa::path(
    get,
    path = "/api/v1/attendance/stats/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose statistics are requested")
    ),
    responses(
        (status = 200, description = "Statistics; `has_valid_data` is false when tracking cannot start", body = AttendanceStats),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_stats(
    source: web::Data<dyn RecordSource>,
    schedules: web::Data<ScheduleCache>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = path.into_inner();
    let today = Local::now().date_naive();

    match stats_for_employee(source.get_ref(), &schedules, employee_id, today).await? {
        Some(stats) => Ok(HttpResponse::Ok().json(stats)),
        None => Err(ServiceError::NotFound("Employee not found".to_string())),
    }
}
